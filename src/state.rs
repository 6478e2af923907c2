use core::cell::RefCell;

/// Upper bound on retained [`TraverseState`] records per thread.
pub const POOL_SIZE: usize = 10;

thread_local! {
	static POOL: RefCell<Vec<TraverseState>> = RefCell::new(Vec::new());
}

/// Reusable per-operation bookkeeping: the operation's composed key prefix and
/// its running visit count.
///
/// Deep child trees acquire and release one record per nesting level of mapped
/// collection results, so records (and the prefix buffers they carry) are kept
/// in a small thread-local pool instead of being reallocated each time.
#[derive(Debug, Default)]
pub struct TraverseState {
	pub key_prefix: String,
	pub count: usize,
}

impl TraverseState {
	/// Takes a cleared record from the pool, or creates one if the pool is
	/// empty.
	pub fn acquire() -> Self {
		POOL.with(|pool| pool.borrow_mut().pop())
			.unwrap_or_default()
	}

	/// Clears this record and returns it to the pool.
	///
	/// Records beyond [`POOL_SIZE`] are dropped instead, so transient traversal
	/// spikes do not pin their peak memory.
	pub fn release(mut self) {
		self.key_prefix.clear();
		self.count = 0;
		POOL.with(|pool| {
			let mut pool = pool.borrow_mut();
			if pool.len() < POOL_SIZE {
				pool.push(self);
			}
		});
	}
}

#[cfg(test)]
pub fn pooled() -> usize {
	POOL.with(|pool| pool.borrow().len())
}
