use serde::{Deserialize, Serialize};

/// Служебные поля строки справочника или тур-плана.
///
/// `version` растёт на каждую запись через `BaseAggregate::touch`,
/// поэтому для тур-плана она отличается от `revision` (та растёт только
/// при генерации и доработке).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityMetadata {
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    /// Удалённые MR и клиенты не попадают в `v_customer_tiers`
    pub is_deleted: bool,
    pub version: i32,
}

impl EntityMetadata {
    pub fn new() -> Self {
        let now = chrono::Utc::now();
        Self {
            created_at: now,
            updated_at: now,
            is_deleted: false,
            version: 0,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now();
    }

    pub fn increment_version(&mut self) {
        self.version += 1;
    }

    /// Вернуть мягко удалённую запись (повторная генерация плана за тот же период)
    pub fn restore(&mut self) {
        self.is_deleted = false;
    }
}

impl Default for EntityMetadata {
    fn default() -> Self {
        Self::new()
    }
}
