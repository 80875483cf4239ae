use crate::domain::a001_medical_representative::aggregate::MedicalRepresentativeId;
use crate::domain::common::{AggregateId, AggregateRoot, BaseAggregate, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// ID типа для агрегата Customer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(pub Uuid);

impl CustomerId {
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

impl AggregateId for CustomerId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }
    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(CustomerId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

/// Категория клиента, определяющая рекомендуемую частоту визитов
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CustomerTier {
    Performer,
    Developer,
    Prospect,
    Unclassified,
}

impl CustomerTier {
    pub const ALL: [CustomerTier; 4] = [
        CustomerTier::Performer,
        CustomerTier::Developer,
        CustomerTier::Prospect,
        CustomerTier::Unclassified,
    ];

    /// Разбор без учёта регистра; пустая строка — `Unclassified`
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "performer" => Ok(CustomerTier::Performer),
            "developer" => Ok(CustomerTier::Developer),
            "prospect" => Ok(CustomerTier::Prospect),
            "unclassified" | "" => Ok(CustomerTier::Unclassified),
            _ => Err(format!("Unknown customer tier: {}", s)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerTier::Performer => "Performer",
            CustomerTier::Developer => "Developer",
            CustomerTier::Prospect => "Prospect",
            CustomerTier::Unclassified => "Unclassified",
        }
    }

    /// Короткий код для сжатого представления в промпте
    pub fn short_code(&self) -> &'static str {
        match self {
            CustomerTier::Performer => "T1",
            CustomerTier::Developer => "T2",
            CustomerTier::Prospect => "T3",
            CustomerTier::Unclassified => "T0",
        }
    }

    /// Рекомендуемое количество визитов в месяц
    pub fn default_monthly_visits(&self) -> u32 {
        match self {
            CustomerTier::Performer => 4,
            CustomerTier::Developer => 2,
            CustomerTier::Prospect => 1,
            CustomerTier::Unclassified => 1,
        }
    }

    /// Порядок при распределении: сначала самые ценные клиенты
    pub fn priority(&self) -> u8 {
        match self {
            CustomerTier::Performer => 0,
            CustomerTier::Developer => 1,
            CustomerTier::Prospect => 2,
            CustomerTier::Unclassified => 3,
        }
    }
}

impl std::fmt::Display for CustomerTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Агрегат клиента (врач, аптека, стокист) в территории MR
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    #[serde(flatten)]
    pub base: BaseAggregate<CustomerId>,

    pub mr_id: MedicalRepresentativeId,

    /// Район (area/patch) внутри территории
    pub area_name: String,

    /// Doctor | Chemist | Stockist
    pub customer_type: String,

    pub specialty: Option<String>,

    pub tier: CustomerTier,

    /// Продажи за последние 3 месяца
    pub sales_last_3m: f64,

    /// Дата последнего визита, `YYYY-MM-DD`
    pub last_visit_date: Option<String>,

    /// Переопределение частоты визитов (иначе — по tier)
    pub visit_frequency: Option<i32>,
}

impl Customer {
    #[allow(clippy::too_many_arguments)]
    pub fn new_for_insert(
        code: String,
        description: String,
        mr_id: MedicalRepresentativeId,
        area_name: String,
        customer_type: String,
        specialty: Option<String>,
        tier: CustomerTier,
        sales_last_3m: f64,
    ) -> Self {
        let base = BaseAggregate::new(CustomerId::new_v4(), code, description);
        Self {
            base,
            mr_id,
            area_name,
            customer_type,
            specialty,
            tier,
            sales_last_3m,
            last_visit_date: None,
            visit_frequency: None,
        }
    }

    /// Обновить поля из DTO; mr_id и tier уже разобраны сервисом
    pub fn update(&mut self, dto: &CustomerDto, mr_id: MedicalRepresentativeId, tier: CustomerTier) {
        if let Some(code) = &dto.code {
            self.base.code = code.clone();
        }
        self.base.description = dto.description.clone();
        self.base.comment = dto.comment.clone();
        self.mr_id = mr_id;
        self.area_name = dto.area_name.clone();
        self.customer_type = dto.customer_type.clone();
        self.specialty = dto.specialty.clone();
        self.tier = tier;
        self.sales_last_3m = dto.sales_last_3m;
        self.last_visit_date = dto.last_visit_date.clone();
        self.visit_frequency = dto.visit_frequency;
    }

    pub fn to_string_id(&self) -> String {
        self.base.id.as_string()
    }

    /// Фактическая месячная норма визитов
    pub fn monthly_visits(&self) -> u32 {
        match self.visit_frequency {
            Some(v) if v > 0 => v as u32,
            _ => self.tier.default_monthly_visits(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        self.base.validate_base()?;
        if self.area_name.trim().is_empty() {
            return Err("Район (area) обязателен".into());
        }
        if self.customer_type.trim().is_empty() {
            return Err("Тип клиента обязателен".into());
        }
        if !self.sales_last_3m.is_finite() || self.sales_last_3m < 0.0 {
            return Err("Продажи не могут быть отрицательными".into());
        }
        if let Some(freq) = self.visit_frequency {
            if !(1..=31).contains(&freq) {
                return Err("Частота визитов должна быть в диапазоне 1-31".into());
            }
        }
        if let Some(date) = &self.last_visit_date {
            if chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
                return Err(format!("Некорректная дата последнего визита: {}", date));
            }
        }
        Ok(())
    }

    pub fn before_write(&mut self) {
        self.base.touch();
    }
}

impl AggregateRoot for Customer {
    type Id = CustomerId;

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
        "a002"
    }

    fn collection_name() -> &'static str {
        "customer"
    }

    fn element_name() -> &'static str {
        "Customer"
    }

    fn list_name() -> &'static str {
        "Customers"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerDto {
    pub id: Option<String>,
    pub code: Option<String>,
    pub description: String,
    pub comment: Option<String>,
    pub mr_id: String,
    pub area_name: String,
    pub customer_type: String,
    pub specialty: Option<String>,
    /// Performer / Developer / Prospect; пусто = Unclassified
    #[serde(default)]
    pub tier: String,
    #[serde(default)]
    pub sales_last_3m: f64,
    pub last_visit_date: Option<String>,
    pub visit_frequency: Option<i32>,
}
