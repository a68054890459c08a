use crate::model::{Page, User};
use rest_actions::RestAction;

pub struct UserFilter {
    #[request_parameter]
    #[not_blank]
    pub query: String,
    #[request_parameter(name = "max")]
    pub limit: Option<u32>,
    pub internal: bool,
}

#[rest_action(GET)]
pub struct ListUsersRestAction;

impl RestAction<UserFilter, Page<User>> for ListUsersRestAction {}

pub struct CreateUserModel {
    #[request_parameter]
    #[not_blank]
    pub name: String,
    #[request_parameter]
    pub age: Option<u32>,
}

#[rest_action(method = "POST")]
pub struct CreateUserRestAction;

impl RestAction<CreateUserModel, ()> for CreateUserRestAction {}

#[rest_action]
pub struct PingRestAction;

impl RestAction<(), ()> for PingRestAction {}

#[rest_action(DELETE)]
pub struct RemoveUserRestAction;

impl RestAction<(), ()> for RemoveUserRestAction {}

#[rest_action(GET)]
pub struct UserLookup;

impl RestAction<(), User> for UserLookup {}
