//! Application services for wallet management.

mod registry;

pub use registry::{
    NativeWalletOutcome, WalletBalances, WalletRegistryError, WalletRegistryResult,
    WalletRegistryService,
};
