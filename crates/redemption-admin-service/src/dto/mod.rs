//! 请求/响应 DTO 模块

pub mod request;
pub mod response;

pub use request::{
    CodeType, CreateLotForm, DeleteLotForm, FilterOption, HasExpiration, LookupForm, LookupMode,
    Modification, ModifyLotForm, RedeemCodeForm, ViewLotForm,
};

pub use response::{
    AwardChoice, CodeLotDetails, HasLotsResponse, LookupResponse, LotMutationResponse,
    LotNamesResponse, RedeemResponse, Reward, RewardsResponse,
};
