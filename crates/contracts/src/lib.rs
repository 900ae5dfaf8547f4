//! Bindings for the contracts the swap interacts with: the 0x v3 exchange
//! and the token standards whose transfers it proxies.

pub mod alloy;
