//! Credentials and tokens: argon2id password hashes ([`password`]) and
//! HS256 access tokens plus opaque refresh tokens ([`jwt`]).

pub mod jwt;
pub mod password;
