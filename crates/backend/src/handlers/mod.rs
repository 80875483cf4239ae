pub mod a001_medical_representative;
pub mod a002_customer;
pub mod a003_monthly_tour_plan;
pub mod d400_territory_performance;
pub mod p900_customer_tiers;
pub mod u501_tour_plan;
