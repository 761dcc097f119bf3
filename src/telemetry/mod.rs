pub mod reauth;
