use async_trait::async_trait;
use mongodb::{Database, bson::doc};
use crate::db::RecoveryStore;
use crate::model::recovery::RecoveryToken;
use crate::utils::errors::WardenError;

const COLLECTION: &str = "RecoveryTokens";

///
/// Recovery-token persistence, backed by MongoDB.
///
pub struct MongoRecoveryStore {
    db: Database,
}

impl MongoRecoveryStore {
    pub fn new(db: Database) -> Self {
        MongoRecoveryStore { db }
    }
}

#[async_trait]
impl RecoveryStore for MongoRecoveryStore {
    async fn insert(&self, token: &RecoveryToken) -> Result<(), WardenError> {
        self.db.collection::<RecoveryToken>(COLLECTION).insert_one(token, None).await?;
        Ok(())
    }

    async fn find_unused(&self, token: &str) -> Result<Option<RecoveryToken>, WardenError> {
        let filter = doc!{ "token": token, "used": false };
        Ok(self.db.collection::<RecoveryToken>(COLLECTION).find_one(filter, None).await?)
    }

    async fn mark_used(&self, token: &str) -> Result<bool, WardenError> {
        // The used == false filter makes the flip conditional - the storage layer, not the
        // application, decides which of two racing callers wins.
        let filter = doc!{ "token": token, "used": false };
        let update = doc!{ "$set": { "used": true } };

        let result = self.db.collection::<RecoveryToken>(COLLECTION)
            .update_one(filter, update, None)
            .await?;

        Ok(result.modified_count == 1)
    }
}
