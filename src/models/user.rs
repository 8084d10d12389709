use serde::{Deserialize, Serialize};

/// 社員プロフィールを表すドメインモデル。
/// このサービスからは読み取り専用で、作成・更新の経路は存在しない。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub userid: i64,
    pub name: String,
    pub imageurl: Option<String>,
    pub department: Option<String>,
    pub profile: Option<String>,
}
