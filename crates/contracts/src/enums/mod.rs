pub mod currency_code;
pub mod member_role;
