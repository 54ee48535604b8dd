pub mod jobmodel;
pub mod notificationmodel;
pub mod usermodel;
pub mod walletmodels;
