pub mod u501_generate_tour_plan;
