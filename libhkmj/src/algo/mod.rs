pub mod decompose;
pub mod fan;
pub mod payout;
