use async_trait::async_trait;
use mongodb::{Database, bson::doc, options::ReplaceOptions};
use crate::db::MemberStore;
use crate::model::member::Member;
use crate::utils::errors::WardenError;

const COLLECTION: &str = "Members";

///
/// The production member directory, backed by MongoDB.
///
pub struct MongoMemberStore {
    db: Database,
}

impl MongoMemberStore {
    pub fn new(db: Database) -> Self {
        MongoMemberStore { db }
    }
}

#[async_trait]
impl MemberStore for MongoMemberStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Member>, WardenError> {
        let filter = doc!{ "email": email };
        Ok(self.db.collection::<Member>(COLLECTION).find_one(filter, None).await?)
    }

    async fn save(&self, member: &Member) -> Result<(), WardenError> {
        let filter = doc!{ "member_id": &member.member_id };
        let options = ReplaceOptions::builder().upsert(true).build();

        self.db.collection::<Member>(COLLECTION)
            .replace_one(filter, member, options)
            .await?;

        Ok(())
    }
}
