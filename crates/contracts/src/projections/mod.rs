pub mod p900_customer_tiers;
