pub mod d400_territory_performance;
