use crate::domain::common::{AggregateId, AggregateRoot, BaseAggregate, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// ID типа для агрегата Medical Representative
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MedicalRepresentativeId(pub Uuid);

impl MedicalRepresentativeId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl AggregateId for MedicalRepresentativeId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }
    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(MedicalRepresentativeId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

/// Агрегат медицинского представителя (MR)
///
/// `base.description` хранит ФИО представителя.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicalRepresentative {
    #[serde(flatten)]
    pub base: BaseAggregate<MedicalRepresentativeId>,

    /// Штаб-квартира (HQ) территории
    pub headquarter: String,

    /// Регион
    pub region: Option<String>,

    /// Руководитель (area manager)
    pub manager_name: Option<String>,

    pub email: Option<String>,
}

impl MedicalRepresentative {
    pub fn new_for_insert(
        code: String,
        description: String,
        headquarter: String,
        region: Option<String>,
        manager_name: Option<String>,
        email: Option<String>,
    ) -> Self {
        let base = BaseAggregate::new(MedicalRepresentativeId::new_v4(), code, description);
        Self {
            base,
            headquarter,
            region,
            manager_name,
            email,
        }
    }

    /// Обновить поля из DTO
    pub fn update(&mut self, dto: &MedicalRepresentativeDto) {
        if let Some(code) = &dto.code {
            self.base.code = code.clone();
        }
        self.base.description = dto.description.clone();
        self.base.comment = dto.comment.clone();
        self.headquarter = dto.headquarter.clone();
        self.region = dto.region.clone();
        self.manager_name = dto.manager_name.clone();
        self.email = dto.email.clone();
    }

    pub fn to_string_id(&self) -> String {
        self.base.id.as_string()
    }

    pub fn name(&self) -> &str {
        &self.base.description
    }

    pub fn validate(&self) -> Result<(), String> {
        self.base.validate_base()?;
        if self.headquarter.trim().is_empty() {
            return Err("Штаб-квартира (HQ) обязательна".into());
        }
        if let Some(email) = &self.email {
            if !email.trim().is_empty() && !email.contains('@') {
                return Err(format!("Некорректный email: {}", email));
            }
        }
        Ok(())
    }

    pub fn before_write(&mut self) {
        self.base.touch();
    }
}

impl AggregateRoot for MedicalRepresentative {
    type Id = MedicalRepresentativeId;

    fn id(&self) -> Self::Id {
        self.base.id
    }

    fn code(&self) -> &str {
        &self.base.code
    }

    fn description(&self) -> &str {
        &self.base.description
    }

    fn metadata(&self) -> &EntityMetadata {
        &self.base.metadata
    }

    fn metadata_mut(&mut self) -> &mut EntityMetadata {
        &mut self.base.metadata
    }

    fn aggregate_index() -> &'static str {
        "a001"
    }

    fn collection_name() -> &'static str {
        "medical_representative"
    }

    fn element_name() -> &'static str {
        "Medical Representative"
    }

    fn list_name() -> &'static str {
        "Medical Representatives"
    }
}

/// DTO для создания/обновления представителя
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicalRepresentativeDto {
    pub id: Option<String>,
    pub code: Option<String>,
    pub description: String,
    pub comment: Option<String>,
    pub headquarter: String,
    pub region: Option<String>,
    pub manager_name: Option<String>,
    pub email: Option<String>,
}
