pub mod product_list;

pub use product_list::load_product_codes;
