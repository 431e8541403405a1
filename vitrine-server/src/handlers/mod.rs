pub mod health;
pub mod orders;
pub mod params;
pub mod product_colors;
