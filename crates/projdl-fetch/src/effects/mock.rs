//! Scripted [`HttpClient`] for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use bytes::Bytes;

use crate::data::ResponseHead;
use crate::effects::http::{HttpClient, Response};
use crate::error::{FetchError, Result};

pub(crate) enum Reply {
    /// The request fails before any response arrives.
    Fail(String),
    /// A response whose body yields these chunks in order.
    Respond {
        head:   ResponseHead,
        chunks: Vec<std::result::Result<Vec<u8>, String>>,
    },
}

impl Reply {
    pub(crate) fn ok(head: ResponseHead, body: &[u8]) -> Self {
        Reply::Respond {
            head,
            chunks: vec![Ok(body.to_vec())],
        }
    }
}

#[derive(Default)]
pub(crate) struct ScriptedClient {
    heads:        Mutex<VecDeque<Reply>>,
    gets:         Mutex<VecDeque<Reply>>,
    get_requests: Mutex<Vec<Vec<(String, String)>>>,
}

impl ScriptedClient {
    pub(crate) fn new() -> Self { Self::default() }

    pub(crate) fn on_head(self, reply: Reply) -> Self {
        self.heads.lock().unwrap().push_back(reply);
        self
    }

    pub(crate) fn on_get(self, reply: Reply) -> Self {
        self.gets.lock().unwrap().push_back(reply);
        self
    }

    /// Headers of every GET issued so far.
    pub(crate) fn get_requests(&self) -> Vec<Vec<(String, String)>> { self.get_requests.lock().unwrap().clone() }

    fn respond(reply: Option<Reply>) -> Result<Response> {
        match reply {
            None => Err(FetchError::Network("no scripted reply".into())),
            Some(Reply::Fail(msg)) => Err(FetchError::Network(msg)),
            Some(Reply::Respond { head, chunks }) => {
                let items = chunks
                    .into_iter()
                    .map(|chunk| chunk.map(Bytes::from).map_err(FetchError::Network));
                Ok(Response {
                    head,
                    body: Box::pin(futures_util::stream::iter(items)),
                })
            }
        }
    }
}

impl HttpClient for ScriptedClient {
    async fn head(&self, _url: &str) -> Result<ResponseHead> {
        let reply = self.heads.lock().unwrap().pop_front();
        Self::respond(reply).map(|r| r.head)
    }

    async fn get(&self, _url: &str, headers: &[(String, String)]) -> Result<Response> {
        self.get_requests.lock().unwrap().push(headers.to_vec());
        let reply = self.gets.lock().unwrap().pop_front();
        Self::respond(reply)
    }

    async fn post_json(&self, _url: &str, _body: &serde_json::Value) -> Result<u16> { Ok(200) }
}
