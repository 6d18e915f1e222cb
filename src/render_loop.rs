//! The State/Render Loop: merge a patch, then rebuild the mounted subtree from scratch.

use crate::{
	build::{BuildError, Builder},
	descriptor::Descriptor,
	host::{Host, Snapshot},
	state::Merge,
};
use core::fmt::{self, Debug, Formatter};
use std::{
	cell::{Cell, Ref, RefCell},
	rc::{Rc, Weak},
};
use thiserror::Error;
use tracing::{debug, error, instrument, trace_span, warn};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
	#[error(transparent)]
	Build(#[from] BuildError),
	#[error("state update requested while a render pass was in progress")]
	Reentrant,
	#[error("the render loop has been dropped")]
	Unmounted,
}

/// Where a [`RenderLoop`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
	/// Before the first render pass completed.
	Uninitialized,
	Idle,
	/// A render pass is running. State updates are rejected with [`RenderError::Reentrant`].
	Rendering,
}

type BuildTree<H, S> = Box<dyn Fn(&S, &Dispatch<H, S>) -> Descriptor<H>>;

/// Owns one state record and one mount point, and re-renders the latter in full whenever the former is patched.
///
/// Renders are synchronous: [`RenderLoop::update_state`] returns only after the mount point shows the new generation.
/// There is no diffing. Anything that has to survive a render (like typed but not yet submitted input) must live in the state.
pub struct RenderLoop<H: Host, S: Merge> {
	host: H,
	builder: Builder,
	mount: RefCell<H::Mount>,
	state: RefCell<S>,
	build_tree: BuildTree<H, S>,
	phase: Cell<Phase>,
	generation: Cell<u64>,
	render_count: Cell<u64>,
	this: Weak<Self>,
}

impl<H, S> RenderLoop<H, S>
where
	H: 'static + Host,
	S: 'static + Merge,
{
	/// Creates a loop with the default HTML vocabulary and performs the first render.
	///
	/// `build_tree` is called exactly once per render pass and should be a pure function of the state.
	/// The [`Dispatch`] it receives can be moved into event handlers to call [`Dispatch::update_state`] later.
	///
	/// # Errors
	///
	/// Iff the first render fails. The loop is discarded in that case.
	pub fn start(host: H, mount: H::Mount, initial_state: S, build_tree: impl 'static + Fn(&S, &Dispatch<H, S>) -> Descriptor<H>) -> Result<Rc<Self>, RenderError> {
		Self::start_with_builder(host, mount, initial_state, Builder::new(), build_tree)
	}

	/// Like [`RenderLoop::start`], but realizes descriptors with the given [`Builder`].
	///
	/// # Errors
	///
	/// Iff the first render fails.
	pub fn start_with_builder(
		host: H,
		mount: H::Mount,
		initial_state: S,
		builder: Builder,
		build_tree: impl 'static + Fn(&S, &Dispatch<H, S>) -> Descriptor<H>,
	) -> Result<Rc<Self>, RenderError> {
		let render_loop = Rc::new_cyclic(|this| Self {
			host,
			builder,
			mount: RefCell::new(mount),
			state: RefCell::new(initial_state),
			build_tree: Box::new(build_tree),
			phase: Cell::new(Phase::Uninitialized),
			generation: Cell::new(0),
			render_count: Cell::new(0),
			this: this.clone(),
		});
		render_loop.render()?;
		Ok(render_loop)
	}

	/// Shallowly merges `patch` into the state, then renders.
	///
	/// Every call renders immediately and in full. An empty patch still re-renders.
	///
	/// # Errors
	///
	/// - [`RenderError::Reentrant`] if called from inside a render pass. Nothing is merged in that case.
	/// - [`RenderError::Build`] if the new tree can't be built.
	///   The patch stays merged, but the mount point keeps showing the previous generation.
	pub fn update_state(&self, patch: S::Patch) -> Result<(), RenderError> {
		if self.phase.get() == Phase::Rendering {
			warn!("Rejected re-entrant state update.");
			return Err(RenderError::Reentrant);
		}
		self.state.borrow_mut().merge(patch);
		self.generation.set(self.generation.get() + 1);
		self.render()
	}

	#[instrument(skip(self), fields(generation = self.generation.get()))]
	fn render(&self) -> Result<(), RenderError> {
		let mut guard = PhaseGuard {
			phase: &self.phase,
			restore: self.phase.replace(Phase::Rendering),
		};

		let root = {
			let span = trace_span!("build_tree");
			let _enter = span.enter();
			let state = self.state.borrow();
			let descriptor = (self.build_tree)(&*state, &self.dispatch());
			self.builder.realize(&self.host, descriptor)
		};
		let root = match root {
			Ok(root) => root,
			Err(error) => {
				error!("Render failed, keeping the previous generation: {}", error);
				return Err(error.into());
			}
		};

		self.host.replace_children(&mut self.mount.borrow_mut(), root);
		guard.restore = Phase::Idle;
		self.render_count.set(self.render_count.get() + 1);
		debug!("Rendered.");
		Ok(())
	}

	/// A weak handle for calling [`RenderLoop::update_state`] from event handlers and async continuations.
	#[must_use]
	pub fn dispatch(&self) -> Dispatch<H, S> {
		Dispatch(self.this.clone())
	}

	#[must_use]
	pub fn state(&self) -> Ref<'_, S> {
		self.state.borrow()
	}

	/// How many patches have been merged so far.
	#[must_use]
	pub fn generation(&self) -> u64 {
		self.generation.get()
	}

	/// How many render passes completed, including the first one.
	#[must_use]
	pub fn render_count(&self) -> u64 {
		self.render_count.get()
	}

	#[must_use]
	pub fn phase(&self) -> Phase {
		self.phase.get()
	}

	#[must_use]
	pub fn host(&self) -> &H {
		&self.host
	}

	/// Read access to the mount point. Don't hold on to this across state updates.
	#[must_use]
	pub fn mount(&self) -> Ref<'_, H::Mount> {
		self.mount.borrow()
	}

	/// The mount point's current content.
	#[must_use]
	pub fn snapshot(&self) -> Vec<Snapshot> {
		self.host.snapshot_children(&self.mount.borrow())
	}
}

impl<H: Host, S: Merge> Debug for RenderLoop<H, S> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("RenderLoop")
			.field("phase", &self.phase.get())
			.field("generation", &self.generation.get())
			.field("render_count", &self.render_count.get())
			.finish()
	}
}

struct PhaseGuard<'a> {
	phase: &'a Cell<Phase>,
	restore: Phase,
}

impl Drop for PhaseGuard<'_> {
	fn drop(&mut self) {
		self.phase.set(self.restore)
	}
}

/// A weak, cloneable handle to a [`RenderLoop`].
pub struct Dispatch<H: Host, S: Merge>(Weak<RenderLoop<H, S>>);

impl<H, S> Dispatch<H, S>
where
	H: 'static + Host,
	S: 'static + Merge,
{
	/// See [`RenderLoop::update_state`].
	///
	/// # Errors
	///
	/// As [`RenderLoop::update_state`], or [`RenderError::Unmounted`] if the loop is gone.
	pub fn update_state(&self, patch: S::Patch) -> Result<(), RenderError> {
		self.0.upgrade().ok_or(RenderError::Unmounted)?.update_state(patch)
	}

	/// Captures the loop's current [generation](`RenderLoop::generation`), for updates that should only apply if nothing else happened in between.
	///
	/// Plain [`Dispatch::update_state`] calls are never guarded, so an async continuation resolving late still applies its patch.
	#[must_use]
	pub fn ticket(&self) -> Ticket<H, S> {
		Ticket {
			dispatch: self.clone(),
			generation: self.0.upgrade().map_or(0, |render_loop| render_loop.generation()),
		}
	}

	#[must_use]
	pub fn is_mounted(&self) -> bool {
		self.0.strong_count() > 0
	}
}

impl<H: Host, S: Merge> Clone for Dispatch<H, S> {
	fn clone(&self) -> Self {
		Self(self.0.clone())
	}
}

impl<H: Host, S: Merge> Debug for Dispatch<H, S> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Dispatch").field(&self.0.strong_count()).finish()
	}
}

/// A [`Dispatch`] that only applies its patch if no other patch was merged since it was taken.
pub struct Ticket<H: Host, S: Merge> {
	dispatch: Dispatch<H, S>,
	generation: u64,
}

impl<H, S> Ticket<H, S>
where
	H: 'static + Host,
	S: 'static + Merge,
{
	#[must_use]
	pub fn generation(&self) -> u64 {
		self.generation
	}

	#[must_use]
	pub fn is_current(&self) -> bool {
		self.dispatch.0.upgrade().map_or(false, |render_loop| render_loop.generation() == self.generation)
	}

	/// Applies `patch` and returns `Ok(true)`, or drops it and returns `Ok(false)` if the ticket is stale.
	///
	/// Applying a patch advances the generation, so each ticket applies at most once.
	///
	/// # Errors
	///
	/// As [`Dispatch::update_state`].
	pub fn update_state(&self, patch: S::Patch) -> Result<bool, RenderError> {
		let render_loop = self.dispatch.0.upgrade().ok_or(RenderError::Unmounted)?;
		if render_loop.generation() != self.generation {
			debug!(ticket = self.generation, current = render_loop.generation(), "Dropped stale patch.");
			return Ok(false);
		}
		render_loop.update_state(patch).map(|()| true)
	}
}

impl<H: Host, S: Merge> Debug for Ticket<H, S> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Ticket").field("generation", &self.generation).finish()
	}
}

#[cfg(test)]
mod tests {
	use super::{Phase, RenderError, RenderLoop};
	use crate::{mem::MemoryHost, state::Record, BuildError, Descriptor};

	#[test]
	fn failed_first_render_discards_the_loop() {
		let host = MemoryHost::new();
		let mount = host.mount_point("app");
		let result = RenderLoop::start(host, mount.clone(), Record::new(), |_, _| Descriptor::new("nope", vec![], vec![]));
		assert_eq!(result.unwrap_err(), RenderError::Build(BuildError::UnknownTag("nope".to_owned())));
		assert!(mount.children().is_empty());
	}

	#[test]
	fn phase_returns_to_idle() {
		let host = MemoryHost::new();
		let mount = host.mount_point("app");
		let render_loop = RenderLoop::start(host, mount, Record::new(), |_, _| Descriptor::new("p", vec![], vec![])).unwrap();
		assert_eq!(render_loop.phase(), Phase::Idle);
		assert_eq!(render_loop.render_count(), 1);
		assert_eq!(render_loop.generation(), 0);

		render_loop.update_state(Record::new()).unwrap();
		assert_eq!(render_loop.phase(), Phase::Idle);
		assert_eq!(render_loop.render_count(), 2);
		assert_eq!(render_loop.generation(), 1);
	}

	#[test]
	fn dispatch_outliving_the_loop() {
		let host = MemoryHost::new();
		let mount = host.mount_point("app");
		let render_loop = RenderLoop::start(host, mount, Record::new(), |_, _| Descriptor::new("p", vec![], vec![])).unwrap();
		let dispatch = render_loop.dispatch();
		let ticket = dispatch.ticket();
		assert!(dispatch.is_mounted());

		drop(render_loop);
		assert!(!dispatch.is_mounted());
		assert!(!ticket.is_current());
		assert_eq!(dispatch.update_state(Record::new()), Err(RenderError::Unmounted));
		assert_eq!(ticket.update_state(Record::new()), Err(RenderError::Unmounted));
	}
}
