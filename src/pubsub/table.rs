use std::{fmt, sync::Arc};

use super::{Agent, Arg, TopicKey};

/// Непрозрачный идентификатор подписки, возвращаемый `subscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub(crate) u64);

impl SubscriptionId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Одна запись подписки.
#[derive(Debug, Clone)]
pub struct Registration {
    pub id: SubscriptionId,
    pub agent: Agent,
    pub args: Arc<[Arg]>,
}

impl Registration {
    /// Идентичность для отписки: тот же агент и равные аргументы.
    fn is(
        &self,
        agent: &Agent,
        args: &[Arg],
    ) -> bool {
        self.agent.same_as(agent) && *self.args == *args
    }
}

#[derive(Debug)]
struct TopicEntry {
    key: TopicKey,
    registrations: Vec<Registration>,
}

/// Почему отписка ничего не удалила.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Miss {
    UnknownTopic,
    UnknownAgent,
}

/// Реестр подписок: ключ топика → упорядоченный список записей.
///
/// Ключи и записи внутри ключа хранятся в порядке вставки, в нём же
/// идёт доставка. Дубликаты допускаются, каждый доставляется отдельно. Ключ без
/// записей удаляется.
#[derive(Debug, Default)]
pub struct SubscriptionTable {
    entries: Vec<TopicEntry>,
}

impl SubscriptionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        key: TopicKey,
        registration: Registration,
    ) {
        match self.entries.iter_mut().find(|e| e.key == key) {
            Some(entry) => entry.registrations.push(registration),
            None => self.entries.push(TopicEntry {
                key,
                registrations: vec![registration],
            }),
        }
    }

    /// Есть ли под `key` хотя бы одна подписка.
    pub fn contains_key(
        &self,
        key: &TopicKey,
    ) -> bool {
        self.entries.iter().any(|e| e.key == *key)
    }

    /// Удаляет первую запись под `key` с тем же агентом и аргументами.
    pub(crate) fn remove(
        &mut self,
        key: &TopicKey,
        agent: &Agent,
        args: &[Arg],
    ) -> Result<Registration, Miss> {
        let idx = self
            .entries
            .iter()
            .position(|e| e.key == *key)
            .ok_or(Miss::UnknownTopic)?;
        let entry = &mut self.entries[idx];
        let pos = entry
            .registrations
            .iter()
            .position(|r| r.is(agent, args))
            .ok_or(Miss::UnknownAgent)?;
        let removed = entry.registrations.remove(pos);
        if entry.registrations.is_empty() {
            self.entries.remove(idx);
        }
        Ok(removed)
    }

    /// Удаляет запись по идентификатору.
    pub fn remove_id(
        &mut self,
        id: SubscriptionId,
    ) -> Option<(TopicKey, Registration)> {
        for idx in 0..self.entries.len() {
            let entry = &mut self.entries[idx];
            if let Some(pos) = entry.registrations.iter().position(|r| r.id == id) {
                let removed = entry.registrations.remove(pos);
                let key = entry.key.clone();
                if entry.registrations.is_empty() {
                    self.entries.remove(idx);
                }
                return Some((key, removed));
            }
        }
        None
    }

    /// Все записи, чей ключ совпадает с опубликованным топиком, в порядке
    /// доставки.
    pub fn matching(
        &self,
        topic: &str,
    ) -> Vec<Registration> {
        self.entries
            .iter()
            .filter(|e| e.key.matches(topic))
            .flat_map(|e| e.registrations.iter().cloned())
            .collect()
    }

    /// Общее число записей.
    pub fn len(&self) -> usize {
        self.entries.iter().map(|e| e.registrations.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn topic_count(&self) -> usize {
        self.entries.len()
    }

    pub fn keys(&self) -> Vec<TopicKey> {
        self.entries.iter().map(|e| e.key.clone()).collect()
    }
}
