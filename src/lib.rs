pub mod address;
pub mod hash;
pub mod transaction;
pub mod transaction_handler;
pub mod transaction_pool;
pub mod utxo_pool;
pub mod validation;

#[cfg(test)]
mod testing;

pub use self::{
    address::*, hash::*, transaction::*, transaction_handler::*, transaction_pool::*,
    utxo_pool::*, validation::*,
};
