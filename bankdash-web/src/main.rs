//! Bankdash Dashboard
//!
//! Entry point for the WASM build (served with trunk).

fn main() {
    bankdash_web::start();
}
