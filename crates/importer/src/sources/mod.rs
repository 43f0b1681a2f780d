pub mod balldontlie;
