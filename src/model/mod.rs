pub mod claims;
pub mod lockout;
pub mod member;
pub mod recovery;
