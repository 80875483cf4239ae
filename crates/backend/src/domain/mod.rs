pub mod a001_medical_representative;
pub mod a002_customer;
pub mod a003_monthly_tour_plan;
