use async_graphql::SimpleObject;
use serde::{Deserialize, Serialize};

const DEFAULT_EMAIL: &str = "admin@company.com";

/// The signed-in dashboard user. Any credentials are accepted, so this is
/// display data only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, SimpleObject)]
pub struct Viewer {
    pub name: String,
    pub email: String,
    pub role: String,
    pub avatar: String,
}

impl Viewer {
    pub fn sign_in(email: &str) -> Self {
        let email = email.trim();
        Self {
            name: "Admin User".into(),
            email: if email.is_empty() {
                DEFAULT_EMAIL.into()
            } else {
                email.into()
            },
            role: "Administrator".into(),
            avatar: "https://i.pravatar.cc/150?img=8".into(),
        }
    }
}
