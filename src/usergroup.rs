// usergroup.rs

use reqwest::Method;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::client_http::Swimlane;
use crate::constants::*;
use crate::error::SwimlaneError;
use crate::validation::{validate_id, validate_str};

type Result<T> = std::result::Result<T, SwimlaneError>;

fn selection(id: &str, name: &str) -> Value {
    json!({
        JSON_KEY_TYPE: TYPE_USER_GROUP_SELECTION,
        JSON_KEY_ID: id,
        JSON_KEY_NAME: name
    })
}

fn array_items(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        // Some endpoints wrap results as {"items": [...]}
        Value::Object(mut obj) => match obj.remove("items") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// A Swimlane user
#[derive(Debug, Clone)]
pub struct User {
    raw: Value,
}

impl User {
    pub fn new(raw: Value) -> Self {
        Self { raw }
    }

    pub fn id(&self) -> &str {
        self.raw[JSON_KEY_ID].as_str().unwrap_or_default()
    }

    pub fn username(&self) -> &str {
        self.raw[JSON_KEY_USER_NAME].as_str().unwrap_or_default()
    }

    /// Display name, falling back to the login name
    pub fn name(&self) -> &str {
        self.raw[JSON_KEY_DISPLAY_NAME].as_str().filter(|s| !s.is_empty()).unwrap_or_else(|| self.username())
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Reference to this user as other resources embed it
    pub fn selection(&self) -> Value {
        selection(self.id(), self.name())
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A Swimlane group
#[derive(Debug, Clone)]
pub struct Group {
    raw: Value,
}

impl Group {
    pub fn new(raw: Value) -> Self {
        Self { raw }
    }

    pub fn id(&self) -> &str {
        self.raw[JSON_KEY_ID].as_str().unwrap_or_default()
    }

    pub fn name(&self) -> &str {
        self.raw[JSON_KEY_NAME].as_str().unwrap_or_default()
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Reference to this group as other resources embed it
    pub fn selection(&self) -> Value {
        selection(self.id(), self.name())
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// User lookups
pub struct UserAdapter {
    swimlane: Arc<Swimlane>,
}

impl UserAdapter {
    pub(crate) fn new(swimlane: Arc<Swimlane>) -> Self {
        Self { swimlane }
    }

    /// List all users
    pub async fn list(&self) -> Result<Vec<User>> {
        let json = self.swimlane.request_json(Method::GET, "user/light", None, None).await?;
        Ok(array_items(json).into_iter().map(User::new).collect())
    }

    /// Get a user by id
    pub async fn get(&self, id: &str) -> Result<User> {
        validate_id(id, "id")?;
        let json = self.swimlane.request_json(Method::GET, &format!("user/{}", id), None, None).await?;
        Ok(User::new(json))
    }

    /// Get a user by exact login name
    pub async fn get_by_username(&self, username: &str) -> Result<User> {
        self.search_exact(username, JSON_KEY_USER_NAME).await
    }

    /// Get a user by exact display name
    pub async fn get_by_display_name(&self, display_name: &str) -> Result<User> {
        self.search_exact(display_name, JSON_KEY_DISPLAY_NAME).await
    }

    async fn search_exact(&self, name: &str, key: &str) -> Result<User> {
        validate_str(name, key)?;

        let mut query = HashMap::new();
        query.insert(HTTP_QUERY_KEY_QUERY.to_string(), name.to_string());
        let json = self.swimlane.request_json(Method::GET, "user/search", None, Some(query)).await?;

        array_items(json)
            .into_iter()
            .find(|u| u[key].as_str() == Some(name))
            .map(User::new)
            .ok_or_else(|| SwimlaneError::NotFound(format!("User with {} '{}'", key, name)))
    }
}

/// Group lookups
pub struct GroupAdapter {
    swimlane: Arc<Swimlane>,
}

impl GroupAdapter {
    pub(crate) fn new(swimlane: Arc<Swimlane>) -> Self {
        Self { swimlane }
    }

    /// List all groups
    pub async fn list(&self) -> Result<Vec<Group>> {
        let json = self.swimlane.request_json(Method::GET, "groups/light", None, None).await?;
        Ok(array_items(json).into_iter().map(Group::new).collect())
    }

    /// Get a group by id
    pub async fn get(&self, id: &str) -> Result<Group> {
        validate_id(id, "id")?;
        let json = self.swimlane.request_json(Method::GET, &format!("groups/{}", id), None, None).await?;
        Ok(Group::new(json))
    }

    /// Get a group by exact name
    pub async fn get_by_name(&self, name: &str) -> Result<Group> {
        validate_str(name, "name")?;

        let mut query = HashMap::new();
        query.insert(HTTP_QUERY_KEY_NAME.to_string(), name.to_string());
        let json = self.swimlane.request_json(Method::GET, "groups/lookup", None, Some(query)).await?;

        array_items(json)
            .into_iter()
            .find(|g| g[JSON_KEY_NAME].as_str() == Some(name))
            .map(Group::new)
            .ok_or_else(|| SwimlaneError::NotFound(format!("Group with name '{}'", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedRequester;

    #[test]
    fn test_user_selection() {
        let user = User::new(json!({"id": "u1", "userName": "admin", "displayName": "Admin User"}));
        assert_eq!(user.name(), "Admin User");
        assert_eq!(user.username(), "admin");

        let sel = user.selection();
        assert_eq!(sel["$type"], TYPE_USER_GROUP_SELECTION);
        assert_eq!(sel["id"], "u1");
        assert_eq!(sel["name"], "Admin User");
    }

    #[test]
    fn test_user_name_falls_back_to_username() {
        let user = User::new(json!({"id": "u1", "userName": "admin", "displayName": ""}));
        assert_eq!(user.name(), "admin");
        assert_eq!(user.to_string(), "admin");
    }

    #[test]
    fn test_array_items_shapes() {
        assert_eq!(array_items(json!([{"id": "a"}])).len(), 1);
        assert_eq!(array_items(json!({"items": [{"id": "a"}, {"id": "b"}]})).len(), 2);
        assert!(array_items(json!("nope")).is_empty());
    }

    #[tokio::test]
    async fn test_user_list_and_get() {
        let (swimlane, requester) = ScriptedRequester::client(vec![
            json!([{"id": "u1", "userName": "admin"}, {"id": "u2", "userName": "analyst"}]),
            json!({"id": "u2", "userName": "analyst", "displayName": "Ann Analyst"}),
        ]);

        let users = swimlane.users().list().await.unwrap();
        assert_eq!(users.iter().map(User::username).collect::<Vec<_>>(), vec!["admin", "analyst"]);

        let user = swimlane.users().get("u2").await.unwrap();
        assert_eq!(user.name(), "Ann Analyst");

        let calls = requester.calls();
        assert_eq!((calls[0].method.clone(), calls[0].endpoint.as_str()), (Method::GET, "user/light"));
        assert_eq!((calls[1].method.clone(), calls[1].endpoint.as_str()), (Method::GET, "user/u2"));
        assert!(calls.iter().all(|c| c.body.is_none()));
    }

    #[tokio::test]
    async fn test_get_by_display_name_matches_exactly() {
        let (swimlane, requester) = ScriptedRequester::client(vec![
            json!([
                {"id": "u3", "userName": "ann2", "displayName": "Ann Analyst II"},
                {"id": "u2", "userName": "ann", "displayName": "Ann Analyst"}
            ]),
            json!([{"id": "u3", "userName": "ann2", "displayName": "Ann Analyst II"}]),
        ]);

        let user = swimlane.users().get_by_display_name("Ann Analyst").await.unwrap();
        assert_eq!(user.id(), "u2");

        let err = swimlane.users().get_by_display_name("Ann Analyst").await.unwrap_err();
        assert!(matches!(err, SwimlaneError::NotFound(_)));

        let call = &requester.calls()[0];
        assert_eq!(call.method, Method::GET);
        assert_eq!(call.endpoint, "user/search");
        assert_eq!(call.query.as_ref().unwrap()["query"], "Ann Analyst");
    }

    #[tokio::test]
    async fn test_group_list_and_get() {
        let (swimlane, requester) = ScriptedRequester::client(vec![
            json!({"items": [{"id": "g1", "name": "SOC"}, {"id": "g2", "name": "IR"}]}),
            json!({"id": "g2", "name": "IR"}),
        ]);

        let groups = swimlane.groups().list().await.unwrap();
        assert_eq!(groups.iter().map(Group::name).collect::<Vec<_>>(), vec!["SOC", "IR"]);

        let group = swimlane.groups().get("g2").await.unwrap();
        assert_eq!(group.id(), "g2");

        let calls = requester.calls();
        assert_eq!((calls[0].method.clone(), calls[0].endpoint.as_str()), (Method::GET, "groups/light"));
        assert_eq!((calls[1].method.clone(), calls[1].endpoint.as_str()), (Method::GET, "groups/g2"));
        assert!(calls.iter().all(|c| c.body.is_none()));
    }
}
