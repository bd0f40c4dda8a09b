//! User directory: who can be messaged.

use std::sync::Arc;

use eduhub_common::{Identity, UserId};

use crate::endpoints;
use crate::gateway::{ApiError, DataEnvelope, Gateway};

pub struct UserDirectory {
    gateway: Arc<Gateway>,
}

impl UserDirectory {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    pub async fn list_users(&self) -> Result<Vec<Identity>, ApiError> {
        let envelope: DataEnvelope<Vec<Identity>> = self.gateway.get(endpoints::USERS).await?;
        Ok(envelope.data)
    }

    /// Everyone except `me`.
    pub async fn list_partners(&self, me: Option<UserId>) -> Result<Vec<Identity>, ApiError> {
        let mut users = self.list_users().await?;
        if let Some(me) = me {
            users.retain(|user| user.id != me);
        }
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::test_support::{FakeTransport, Harness, Reply};

    #[tokio::test]
    async fn partners_exclude_self() {
        let transport = FakeTransport::new(|_| {
            Reply::json(
                200,
                json!({"data": [
                    {"id": 1, "username": "an", "email": "an@eduhub.vn", "display_name": "An"},
                    {"id": 3, "username": "binh", "email": "b@eduhub.vn", "display_name": ""},
                    {"id": 7, "username": "chi", "email": "c@eduhub.vn", "display_name": "Chi"}
                ]}),
            )
        });
        let h = Harness::new(transport);
        let directory = UserDirectory::new(Arc::clone(&h.gateway));

        let partners = directory.list_partners(Some(UserId(1))).await.unwrap();
        let ids: Vec<_> = partners.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![UserId(3), UserId(7)]);

        let everyone = directory.list_partners(None).await.unwrap();
        assert_eq!(everyone.len(), 3);
    }

    #[tokio::test]
    async fn failures_propagate() {
        let transport = FakeTransport::new(|_| Reply::json(500, json!({"error": "database error"})));
        let h = Harness::new(transport);

        let err = UserDirectory::new(Arc::clone(&h.gateway))
            .list_users()
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "database error");
    }
}
