use serde::Serialize;

#[derive(Serialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    #[serde(rename = "emailAddress")]
    pub email: Option<String>,
    pub roles: Vec<Role>,
    pub manager: Option<Box<User>>,
    #[serde(skip)]
    pub password_hash: String,
}

#[derive(Serialize)]
pub enum Role {
    Admin,
    Member,
}

#[derive(Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u32,
}

#[derive(Serialize)]
pub struct Category {
    pub name: String,
    pub parent: Option<Box<Category>>,
    pub children: Vec<Category>,
}
