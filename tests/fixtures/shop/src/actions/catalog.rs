use crate::model::Category;
use rest_actions::RestAction;

#[rest_action(GET)]
pub struct ListCategoriesRestAction;

impl RestAction<(), Vec<Category>> for ListCategoriesRestAction {}
