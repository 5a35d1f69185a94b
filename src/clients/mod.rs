pub mod jsonbin;
pub mod roblox;
