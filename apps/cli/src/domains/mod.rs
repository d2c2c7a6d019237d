pub mod insight;
pub mod ledger;
