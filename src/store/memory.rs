// In-memory store used by the operation and router tests

use async_trait::async_trait;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};

use super::EneStore;
use crate::{
    error::ApiResult,
    models::{message::RECENT_LIMIT, MessageFilter, MessageRow, NewMessage, User},
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    messages: Vec<MessageRow>,
    empathy: Vec<(i64, i64)>,
    next_id: i64,
}

/// Vec-backed `EneStore` that counts reads and writes.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, userid: i64, name: &str) -> Self {
        self.tables.lock().unwrap().users.push(User {
            userid,
            name: name.to_string(),
            imageurl: Some(format!("https://example.com/{}.png", userid)),
            department: Some("Engineering".to_string()),
            profile: None,
        });
        self
    }

    pub fn with_message(self, id: i64, sender: i64, receiver: i64, contents: &str, datetime: &str) -> Self {
        {
            let mut tables = self.tables.lock().unwrap();
            tables.messages.push(MessageRow {
                id,
                contents: contents.to_string(),
                sender,
                receiver,
                datetime: datetime.to_string(),
            });
            tables.next_id = tables.next_id.max(id);
        }
        self
    }

    pub fn with_empathy(self, message_id: i64, userid: i64) -> Self {
        self.tables.lock().unwrap().empathy.push((message_id, userid));
        self
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn messages(&self) -> Vec<MessageRow> {
        self.tables.lock().unwrap().messages.clone()
    }

    pub fn marks(&self) -> Vec<(i64, i64)> {
        self.tables.lock().unwrap().empathy.clone()
    }

    fn read(&self) {
        self.reads.fetch_add(1, Ordering::SeqCst);
    }

    fn write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl EneStore for MemoryStore {
    async fn ping(&self) -> ApiResult<()> {
        Ok(())
    }

    async fn list_messages(&self, filter: MessageFilter) -> ApiResult<Vec<MessageRow>> {
        self.read();
        let tables = self.tables.lock().unwrap();
        let mut rows: Vec<MessageRow> = tables
            .messages
            .iter()
            .filter(|m| match filter {
                MessageFilter::ById(id) => m.id == id,
                MessageFilter::BySender(id) => m.sender == id,
                MessageFilter::ByReceiver(id) => m.receiver == id,
                MessageFilter::OutOfRange { .. } => false,
                MessageFilter::Recent => true,
            })
            .cloned()
            .collect();

        if !matches!(filter, MessageFilter::ById(_)) {
            rows.sort_by(|a, b| b.datetime.cmp(&a.datetime));
            rows.truncate(RECENT_LIMIT as usize);
        }
        Ok(rows)
    }

    async fn insert_message(&self, message: &NewMessage) -> ApiResult<i64> {
        self.write();
        let mut tables = self.tables.lock().unwrap();
        tables.next_id += 1;
        let id = tables.next_id;
        tables.messages.push(MessageRow {
            id,
            contents: message.contents.clone(),
            sender: message.sender,
            receiver: message.receiver,
            datetime: message.datetime.clone(),
        });
        Ok(id)
    }

    async fn delete_message(&self, id: i64) -> ApiResult<u64> {
        self.write();
        let mut tables = self.tables.lock().unwrap();
        let before = tables.messages.len();
        tables.messages.retain(|m| m.id != id);
        Ok((before - tables.messages.len()) as u64)
    }

    async fn find_user(&self, userid: i64) -> ApiResult<Option<User>> {
        self.read();
        let tables = self.tables.lock().unwrap();
        Ok(tables.users.iter().find(|u| u.userid == userid).cloned())
    }

    async fn list_users(&self) -> ApiResult<Vec<User>> {
        self.read();
        Ok(self.tables.lock().unwrap().users.clone())
    }

    async fn empathizers(&self, message_id: i64) -> ApiResult<Vec<i64>> {
        self.read();
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .empathy
            .iter()
            .filter(|(m, _)| *m == message_id)
            .map(|(_, u)| *u)
            .collect())
    }

    async fn has_empathy(&self, message_id: i64, userid: i64) -> ApiResult<bool> {
        self.read();
        Ok(self.tables.lock().unwrap().empathy.contains(&(message_id, userid)))
    }

    async fn count_empathy(&self, message_id: i64) -> ApiResult<i64> {
        self.read();
        let tables = self.tables.lock().unwrap();
        Ok(tables.empathy.iter().filter(|(m, _)| *m == message_id).count() as i64)
    }

    async fn insert_empathy(&self, message_id: i64, userid: i64) -> ApiResult<u64> {
        self.write();
        self.tables.lock().unwrap().empathy.push((message_id, userid));
        Ok(1)
    }

    async fn delete_empathy(&self, message_id: i64, userid: i64) -> ApiResult<u64> {
        self.write();
        let mut tables = self.tables.lock().unwrap();
        let before = tables.empathy.len();
        tables.empathy.retain(|mark| *mark != (message_id, userid));
        Ok((before - tables.empathy.len()) as u64)
    }
}
