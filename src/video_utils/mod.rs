pub mod drawing;
pub mod mat_conversion;
