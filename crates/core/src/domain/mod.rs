pub mod customer;
pub mod invoice;
pub mod lead;
pub mod product;
pub mod quotation;
