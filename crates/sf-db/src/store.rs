use rusqlite::Connection;
use sf_core::error::SkillForgeError;
use sf_core::store::Store;

use crate::activity_repo::ActivityRepo;
use crate::category_repo::CategoryRepo;
use crate::event_repo::EventRepo;
use crate::package_repo::PackageRepo;
use crate::player_repo::PlayerRepo;
use crate::quest_repo::QuestRepo;
use crate::template_repo::TemplateRepo;
use crate::tip_repo::TipRepo;

pub struct DbStore {
    conn: Connection,
}

impl DbStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl Store for DbStore {
    type Quests<'a>
        = QuestRepo<'a>
    where
        Self: 'a;
    type Templates<'a>
        = TemplateRepo<'a>
    where
        Self: 'a;
    type Players<'a>
        = PlayerRepo<'a>
    where
        Self: 'a;
    type Categories<'a>
        = CategoryRepo<'a>
    where
        Self: 'a;
    type Tips<'a>
        = TipRepo<'a>
    where
        Self: 'a;
    type Packages<'a>
        = PackageRepo<'a>
    where
        Self: 'a;
    type Activities<'a>
        = ActivityRepo<'a>
    where
        Self: 'a;
    type Events<'a>
        = EventRepo<'a>
    where
        Self: 'a;

    fn quests(&self) -> Self::Quests<'_> {
        QuestRepo::new(&self.conn)
    }

    fn templates(&self) -> Self::Templates<'_> {
        TemplateRepo::new(&self.conn)
    }

    fn players(&self) -> Self::Players<'_> {
        PlayerRepo::new(&self.conn)
    }

    fn categories(&self) -> Self::Categories<'_> {
        CategoryRepo::new(&self.conn)
    }

    fn tips(&self) -> Self::Tips<'_> {
        TipRepo::new(&self.conn)
    }

    fn packages(&self) -> Self::Packages<'_> {
        PackageRepo::new(&self.conn)
    }

    fn activities(&self) -> Self::Activities<'_> {
        ActivityRepo::new(&self.conn)
    }

    fn events(&self) -> Self::Events<'_> {
        EventRepo::new(&self.conn)
    }

    fn with_tx<F, T>(&self, f: F) -> Result<T, SkillForgeError>
    where
        F: FnOnce(&Self) -> Result<T, SkillForgeError>,
    {
        self.conn
            .execute_batch("BEGIN IMMEDIATE")
            .map_err(internal)?;
        let result = f(self);
        match result {
            Ok(value) => {
                self.conn.execute_batch("COMMIT").map_err(internal)?;
                Ok(value)
            }
            Err(err) => {
                self.conn.execute_batch("ROLLBACK").map_err(internal)?;
                Err(err)
            }
        }
    }
}

fn internal(err: rusqlite::Error) -> SkillForgeError {
    SkillForgeError::Internal {
        message: err.to_string(),
    }
}
