pub mod cases;
pub mod images;
