//! `mockall` doubles for the host traits.
//!
//! [`HostAnswers`] collects scripted member results per target and builds a
//! [`MockHostGraph`] whose objects answer from that table, counting every member
//! access so scenarios can assert whether the host was reached at all.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use mockall::mock;
use serde_json::Value;

use crate::host::{Host, HostError, HostObject};

mock! {
    pub HostGraph {}

    impl Host for HostGraph {
        fn label_value(&self, name: &str) -> Option<String>;
        fn api(&self) -> Arc<dyn HostObject>;
        fn note(&self, id: &str) -> Option<Arc<dyn HostObject>>;
        fn branch(&self, id: &str) -> Option<Arc<dyn HostObject>>;
        fn attribute(&self, id: &str) -> Option<Arc<dyn HostObject>>;
        fn sql(&self) -> Arc<dyn HostObject>;
    }
}

mock! {
    pub HostHandle {}

    impl HostObject for HostHandle {
        fn read(&self, property: &str) -> Result<Value, HostError>;
        fn call(&self, method: &str, args: &[Value]) -> Result<Value, HostError>;
    }
}

/// Object a scripted answer belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    Api,
    Note(String),
    Sql,
}

type Script = HashMap<String, Result<Value, HostError>>;

/// Scripted member results keyed by target.
#[derive(Debug, Default)]
pub struct HostAnswers {
    scripts: HashMap<Target, Script>,
    calls: Arc<AtomicUsize>,
}

impl HostAnswers {
    /// Scripts `member` on `target` to produce `result`.
    pub fn answer(&mut self, target: Target, member: &str, result: Result<Value, HostError>) {
        self.scripts
            .entry(target)
            .or_default()
            .insert(member.to_owned(), result);
    }

    /// Number of member reads and calls the host has served.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Builds a host holding `token` under every label.
    pub fn build(&self, token: &str) -> MockHostGraph {
        let mut host = MockHostGraph::new();
        let token = token.to_owned();
        host.expect_label_value()
            .returning(move |_| Some(token.clone()));

        let api = self.object(&Target::Api);
        host.expect_api().returning(move || Arc::clone(&api));
        let sql = self.object(&Target::Sql);
        host.expect_sql().returning(move || Arc::clone(&sql));

        let notes: HashMap<String, Arc<dyn HostObject>> = self
            .scripts
            .keys()
            .filter_map(|target| match target {
                Target::Note(id) => Some((id.clone(), self.object(target))),
                _ => None,
            })
            .collect();
        host.expect_note()
            .returning(move |id| notes.get(id).cloned());
        host.expect_branch().returning(|_| None);
        host.expect_attribute().returning(|_| None);
        host
    }

    fn object(&self, target: &Target) -> Arc<dyn HostObject> {
        let script = Arc::new(self.scripts.get(target).cloned().unwrap_or_default());
        let mut object = MockHostHandle::new();

        let (reads, read_calls) = (Arc::clone(&script), Arc::clone(&self.calls));
        object.expect_read().returning(move |property| {
            read_calls.fetch_add(1, Ordering::SeqCst);
            scripted(&reads, property)
        });
        let (methods, method_calls) = (script, Arc::clone(&self.calls));
        object.expect_call().returning(move |method, _| {
            method_calls.fetch_add(1, Ordering::SeqCst);
            scripted(&methods, method)
        });
        Arc::new(object)
    }
}

fn scripted(script: &Script, member: &str) -> Result<Value, HostError> {
    script
        .get(member)
        .cloned()
        .unwrap_or_else(|| Err(HostError::new(format!("{member} is not scripted"))))
}
