//! Scripted in-memory [`Backend`] for tests.
//!
//! Requests are queued and answered one event per `iterate()`, so callbacks
//! only ever run inside the pump. Every operation handle is counted when it
//! is created and when it is dropped.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use pmixer_core::{ChannelVolumes, Volume};

use crate::backend::{
    Backend, ContextState, ListItem, OperationState, PendingOperation, ServerInfoCallback,
    SinkInfoCallback, SinkRecord, StateObserver, SuccessCallback,
};
use crate::error::{PulseError, PulseResult};

/// What the fake saw, shared with the test after the fake is moved away.
#[derive(Debug, Default)]
pub struct FakeLog {
    pub server: Option<String>,
    pub created: usize,
    pub released: usize,
    pub volume_calls: Vec<(u32, ChannelVolumes)>,
    pub mute_calls: Vec<(u32, bool)>,
    pub disconnected: bool,
}

pub type SharedLog = Rc<RefCell<FakeLog>>;

pub struct FakeOperation {
    state: Rc<Cell<OperationState>>,
    log: SharedLog,
}

impl PendingOperation for FakeOperation {
    fn state(&self) -> OperationState {
        self.state.get()
    }
}

impl Drop for FakeOperation {
    fn drop(&mut self) {
        self.log.borrow_mut().released += 1;
    }
}

#[derive(Debug, Clone)]
pub struct FakeSink(SinkRecord);

impl FakeSink {
    pub fn new(index: u32, name: &str, volume: ChannelVolumes) -> Self {
        Self(SinkRecord {
            index,
            name: name.to_string(),
            muted: false,
            volume,
        })
    }

    pub fn stereo(index: u32, name: &str, raw: u32) -> Self {
        Self::new(index, name, ChannelVolumes::uniform(2, Volume(raw)).unwrap())
    }

    pub fn muted(mut self) -> Self {
        self.0.muted = true;
        self
    }
}

enum Event {
    State(ContextState),
    Task(Box<dyn FnOnce()>),
}

enum RequestMode {
    Answer,
    Cancel,
    Stall,
    FailContext,
    DropReply,
}

pub struct FakeServer {
    states: Vec<ContextState>,
    reported_in_connect: Vec<ContextState>,
    default_sink: Option<String>,
    sinks: Vec<(String, pmixer_core::Result<SinkRecord>)>,
    refuse_connect: bool,
    mode: RequestMode,
    reject_mutations: bool,
    sink_lookup_errors: bool,
    observer: Option<StateObserver>,
    events: VecDeque<Event>,
    log: SharedLog,
}

impl FakeServer {
    pub fn new() -> Self {
        Self {
            states: vec![ContextState::Connecting, ContextState::Ready],
            reported_in_connect: Vec::new(),
            default_sink: Some("speakers".to_string()),
            sinks: Vec::new(),
            refuse_connect: false,
            mode: RequestMode::Answer,
            reject_mutations: false,
            sink_lookup_errors: false,
            observer: None,
            events: VecDeque::new(),
            log: SharedLog::default(),
        }
    }

    pub fn log(&self) -> SharedLog {
        Rc::clone(&self.log)
    }

    pub fn with_states(mut self, states: &[ContextState]) -> Self {
        self.states = states.to_vec();
        self
    }

    /// Deliver `states` from inside `connect`, before it returns.
    pub fn reporting_during_connect(mut self, states: &[ContextState]) -> Self {
        self.reported_in_connect = states.to_vec();
        self
    }

    pub fn with_sink(mut self, sink: FakeSink) -> Self {
        self.sinks.push((sink.0.name.clone(), Ok(sink.0)));
        self
    }

    /// A record under `name` that fails conversion with `error`.
    pub fn with_malformed_sink(mut self, name: &str, error: pmixer_core::Error) -> Self {
        self.sinks.push((name.to_string(), Err(error)));
        self
    }

    pub fn with_default_sink_name(mut self, name: &str) -> Self {
        self.default_sink = Some(name.to_string());
        self
    }

    pub fn without_default_sink(mut self) -> Self {
        self.default_sink = None;
        self
    }

    pub fn refusing_connections(mut self) -> Self {
        self.refuse_connect = true;
        self
    }

    pub fn cancelling_requests(mut self) -> Self {
        self.mode = RequestMode::Cancel;
        self
    }

    pub fn stalling_requests(mut self) -> Self {
        self.mode = RequestMode::Stall;
        self
    }

    pub fn failing_after_connect(mut self) -> Self {
        self.mode = RequestMode::FailContext;
        self
    }

    /// Complete every request without invoking its callback.
    pub fn dropping_replies(mut self) -> Self {
        self.mode = RequestMode::DropReply;
        self
    }

    pub fn rejecting_mutations(mut self) -> Self {
        self.reject_mutations = true;
        self
    }

    /// Fail sink lookups the way libpulse does: one error callback, no end
    /// of list.
    pub fn erroring_sink_lookups(mut self) -> Self {
        self.sink_lookup_errors = true;
        self
    }

    /// Create a handle and queue `answer` to run when the request completes.
    fn request(&mut self, answer: impl FnOnce() + 'static) -> FakeOperation {
        self.log.borrow_mut().created += 1;
        let state = Rc::new(Cell::new(OperationState::Running));

        let done = Rc::clone(&state);
        match self.mode {
            RequestMode::Answer => self.events.push_back(Event::Task(Box::new(move || {
                answer();
                done.set(OperationState::Done);
            }))),
            RequestMode::Cancel => self.events.push_back(Event::Task(Box::new(move || {
                drop(answer);
                done.set(OperationState::Cancelled);
            }))),
            RequestMode::DropReply => self.events.push_back(Event::Task(Box::new(move || {
                drop(answer);
                done.set(OperationState::Done);
            }))),
            RequestMode::Stall => {}
            RequestMode::FailContext => {
                self.events.push_back(Event::State(ContextState::Failed));
                self.events.push_back(Event::Task(Box::new(move || {
                    done.set(OperationState::Cancelled);
                })));
            }
        }

        FakeOperation {
            state,
            log: Rc::clone(&self.log),
        }
    }
}

impl Backend for FakeServer {
    type Operation = FakeOperation;

    fn connect(&mut self, server: Option<&str>, mut observer: StateObserver) -> PulseResult<()> {
        self.log.borrow_mut().server = server.map(String::from);
        if self.refuse_connect {
            return Err(PulseError::ConnectionFailed("Connection refused".to_string()));
        }
        for state in &self.reported_in_connect {
            observer(*state);
        }
        self.observer = Some(observer);
        self.events
            .extend(self.states.iter().copied().map(Event::State));
        Ok(())
    }

    fn iterate(&mut self) -> PulseResult<()> {
        match self.events.pop_front() {
            Some(Event::State(state)) => {
                if let Some(observer) = self.observer.as_mut() {
                    observer(state);
                }
                Ok(())
            }
            Some(Event::Task(task)) => {
                task();
                Ok(())
            }
            None => Err(PulseError::MainLoopError("Nothing left to dispatch".to_string())),
        }
    }

    fn server_info(&mut self, mut callback: ServerInfoCallback) -> FakeOperation {
        let name = self.default_sink.clone();
        self.request(move || callback(name))
    }

    fn sink_info_by_name(&mut self, name: &str, mut callback: SinkInfoCallback) -> FakeOperation {
        let matching: Vec<ListItem<SinkRecord>> = self
            .sinks
            .iter()
            .filter(|(sink, _)| sink == name)
            .map(|(_, record)| match record {
                Ok(record) => ListItem::Item(record.clone()),
                Err(e) => ListItem::Invalid(e.clone()),
            })
            .collect();
        let error = self.sink_lookup_errors;
        self.request(move || {
            if error {
                callback(ListItem::Error);
                return;
            }
            for item in matching {
                callback(item);
            }
            callback(ListItem::End);
        })
    }

    fn set_sink_volume_by_index(
        &mut self,
        index: u32,
        volume: &ChannelVolumes,
        mut callback: SuccessCallback,
    ) -> FakeOperation {
        self.log.borrow_mut().volume_calls.push((index, volume.clone()));
        let success = !self.reject_mutations;
        self.request(move || callback(success))
    }

    fn set_sink_mute_by_index(
        &mut self,
        index: u32,
        muted: bool,
        mut callback: SuccessCallback,
    ) -> FakeOperation {
        self.log.borrow_mut().mute_calls.push((index, muted));
        let success = !self.reject_mutations;
        self.request(move || callback(success))
    }

    fn disconnect(&mut self) {
        self.log.borrow_mut().disconnected = true;
    }
}
