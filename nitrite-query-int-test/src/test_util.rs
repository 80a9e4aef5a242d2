use nitrite_query::collection::{Document, NitriteCollection};
use nitrite_query::doc;
use nitrite_query::errors::NitriteResult;
use nitrite_query::nitrite_config::NitriteConfig;
use nitrite_query::store::{InMemoryRecordStore, RecordStore};
use std::backtrace::Backtrace;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

#[ctor::ctor]
unsafe fn init_logging() {
    let _ = colog::default_builder().try_init();
}

/// Runs a test with retry logic and error handling.
/// Tests run on the current thread to avoid thread exhaustion when running many tests in parallel.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> NitriteResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    B: Fn() -> NitriteResult<TestContext> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    A: Fn(TestContext) -> NitriteResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
{
    const MAX_RETRIES: u32 = 3;
    let mut last_error: Option<String> = None;
    let mut last_backtrace: Option<String> = None;

    for attempt in 1..=MAX_RETRIES {
        let start_time = Instant::now();

        let result = std::panic::catch_unwind(|| {
            let backtrace = Backtrace::capture();
            match before() {
                Ok(ctx) => match test(ctx.clone()) {
                    Ok(_) => after(ctx)
                        .map_err(|e| (format!("After run failed: {:?}", e), backtrace.to_string())),
                    Err(e) => {
                        let _ = after(ctx);
                        Err((format!("Test failed: {:?}", e), backtrace.to_string()))
                    }
                },
                Err(e) => Err((format!("Before run failed: {:?}", e), backtrace.to_string())),
            }
        });

        let elapsed = start_time.elapsed();

        match result {
            Ok(Ok(_)) => return,
            Ok(Err((e, bt))) => {
                last_error = Some(e.clone());
                last_backtrace = Some(bt);
                if attempt < MAX_RETRIES {
                    eprintln!(
                        "\n========== Test Attempt {}/{} Failed (took {:?}) ==========",
                        attempt, MAX_RETRIES, elapsed
                    );
                    eprintln!("Error: {}", e);
                    thread::sleep(Duration::from_millis(100 * attempt as u64));
                }
            }
            Err(panic_err) => {
                let err_msg = if let Some(s) = panic_err.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_err.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };

                eprintln!(
                    "\n========== Test Attempt {}/{} Panicked (took {:?}) ==========",
                    attempt, MAX_RETRIES, elapsed
                );
                eprintln!("Panic: {}", err_msg);
                last_error = Some(format!("Panic: {}", err_msg));
                last_backtrace = Some(Backtrace::capture().to_string());

                if attempt < MAX_RETRIES {
                    thread::sleep(Duration::from_millis(100 * attempt as u64));
                }
            }
        }
    }

    eprintln!("\n==================== TEST FAILED ====================");
    eprintln!("Failed after {} attempts", MAX_RETRIES);
    eprintln!("Last error: {}", last_error.as_deref().unwrap_or("Unknown"));
    if let Some(bt) = &last_backtrace {
        if !bt.is_empty() && !bt.contains("disabled") {
            eprintln!("\nBacktrace:\n{}", bt);
        }
    }
    eprintln!("=====================================================\n");

    panic!(
        "Test failed after {} attempts. Last error: {}",
        MAX_RETRIES,
        last_error.unwrap_or_default()
    );
}

/// Collections opened by one test run, keyed by name.
#[derive(Clone)]
pub struct TestContext {
    config: NitriteConfig,
    collections: Arc<Mutex<HashMap<String, NitriteCollection>>>,
}

impl TestContext {
    pub fn new(config: NitriteConfig) -> Self {
        Self {
            config,
            collections: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns the collection with this name, opening an empty in-memory one
    /// the first time.
    pub fn collection(&self, name: &str) -> NitriteResult<NitriteCollection> {
        let mut collections = self.collections.lock().unwrap();
        if let Some(collection) = collections.get(name) {
            return Ok(collection.clone());
        }

        let collection = NitriteCollection::with_store(
            name,
            self.config.clone(),
            RecordStore::new(InMemoryRecordStore::new()),
        )?;
        collections.insert(name.to_string(), collection.clone());
        Ok(collection)
    }

    pub fn config(&self) -> NitriteConfig {
        self.config.clone()
    }
}

pub fn create_test_context() -> NitriteResult<TestContext> {
    Ok(TestContext::new(NitriteConfig::new()))
}

pub fn cleanup(ctx: TestContext) -> NitriteResult<()> {
    let collections: Vec<NitriteCollection> = ctx.collections.lock().unwrap().drain().map(|(_, c)| c).collect();
    for collection in collections {
        collection.clear()?;
    }
    Ok(())
}

pub fn create_test_docs() -> Vec<Document> {
    let doc1 = doc! {
        first_name: "fn1",
        last_name: "ln1",
        birth_day: "2012-07-01T02:15:22+02:00",
        age: 12,
        arr: [1, 2, 3],
        list: ["one", "two", "three"],
        body: "a quick brown fox jump over the lazy dog",
    };

    let doc2 = doc! {
        first_name: "fn2",
        last_name: "ln2",
        birth_day: "2010-06-12T12:05:35+05:30",
        age: 14,
        arr: [3, 4, 3],
        list: ["three", "four", "five"],
        body: "quick hello world from nitrite",
    };

    let doc3 = doc! {
        first_name: "fn3",
        last_name: "ln2",
        birth_day: "2014-04-17T22:25:44-04:00",
        age: 10,
        arr: [9, 4, 8],
        body: "Lorem ipsum dolor sit amet, consectetur \
        adipiscing elit. Sed nunc mi, mattis ullamcorper \
        dignissim vitae, condimentum non lorem.",
    };

    vec![doc1, doc2, doc3]
}

pub fn insert_test_documents(collection: &NitriteCollection) -> NitriteResult<()> {
    collection.insert_many(create_test_docs())?;
    Ok(())
}

pub fn is_sorted<T: PartialOrd>(iterable: impl IntoIterator<Item = T>, ascending: bool) -> bool {
    let mut iter = iterable.into_iter();
    if let Some(mut prev) = iter.next() {
        for current in iter {
            if ascending && prev > current {
                return false;
            }
            if !ascending && prev < current {
                return false;
            }
            prev = current;
        }
    }
    true
}
