use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::ast::{ClassDef, FunctionDef};
use crate::config::Config;
use crate::event::Event;

use super::Value;

pub(super) type Frame = FxHashMap<String, Value>;

/// Methods collected from a class body. Classes are recorded, never invoked.
#[derive(Debug, Clone)]
pub struct ClassRecord {
    pub name: String,
    pub methods: FxHashMap<String, Rc<FunctionDef>>,
}

/// All state of one interpreter: variables, definitions, pending events.
pub(super) struct Context {
    globals: Frame,
    frames: Vec<Frame>,
    functions: FxHashMap<String, Rc<FunctionDef>>,
    classes: FxHashMap<String, ClassRecord>,
    events: Vec<Event>,
    pub(super) config: Config,
}

impl Context {
    pub(super) fn new(config: Config) -> Self {
        Self {
            globals: Frame::default(),
            frames: Vec::new(),
            functions: FxHashMap::default(),
            classes: FxHashMap::default(),
            events: Vec::new(),
            config,
        }
    }

    /// Top frame first, then globals. Caller frames are never visible.
    pub(super) fn lookup(&self, name: &str) -> Option<&Value> {
        if let Some(frame) = self.frames.last()
            && let Some(value) = frame.get(name)
        {
            return Some(value);
        }
        self.globals.get(name)
    }

    /// The frame that writes go to.
    pub(super) fn scope(&self) -> &Frame {
        self.frames.last().unwrap_or(&self.globals)
    }

    pub(super) fn store(&mut self, name: String, value: Value) {
        let scope = match self.frames.last_mut() {
            Some(frame) => frame,
            None => &mut self.globals,
        };
        scope.insert(name, value);
    }

    pub(super) fn global(&self, name: &str) -> Option<&Value> {
        self.globals.get(name)
    }

    pub(super) fn push_frame(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    pub(super) fn pop_frame(&mut self) {
        self.frames.pop();
    }

    pub(super) fn frame_depth(&self) -> usize {
        self.frames.len()
    }

    pub(super) fn function(&self, name: &str) -> Option<Rc<FunctionDef>> {
        self.functions.get(name).cloned()
    }

    pub(super) fn class(&self, name: &str) -> Option<&ClassRecord> {
        self.classes.get(name)
    }

    /// Later definitions with the same name replace earlier ones.
    pub(super) fn define_function(&mut self, function: &FunctionDef) {
        self.emit(Event::FunctionRegistered {
            signature: function.signature(),
        });
        self.functions
            .insert(function.name.clone(), Rc::new(function.clone()));
    }

    pub(super) fn define_class(&mut self, class: &ClassDef) {
        self.emit(Event::ClassRegistered {
            name: class.name.clone(),
        });
        let mut methods = FxHashMap::default();
        for method in &class.methods {
            self.emit(Event::MethodRegistered {
                class: class.name.clone(),
                signature: method.signature(),
            });
            methods.insert(method.name.clone(), Rc::new(method.clone()));
        }
        self.classes.insert(
            class.name.clone(),
            ClassRecord {
                name: class.name.clone(),
                methods,
            },
        );
    }

    pub(super) fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub(super) fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}
