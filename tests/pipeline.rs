use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use conduit::DispatchError;
use conduit::company::{self, AddHash, AddKey, CompanyCreated, CreateCompany, CreateCompanyHandler};
use conduit::pipeline::{
    Behavior, BoxFuture, Command, CommandHandler, DispatchResult, Mediator, Next, Pipeline, handler_fn,
};
use regex::Regex;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

fn command(name: &str) -> CreateCompany {
    CreateCompany {
        name: name.to_owned(),
        address: format!("{name} Street 1"),
        key: String::new(),
        hash: String::new(),
    }
}

/// Wraps the real handler and counts how often it runs.
fn counted(calls: Arc<AtomicUsize>) -> impl CommandHandler<CreateCompany> {
    handler_fn(move |cmd: CreateCompany| {
        let calls = Arc::clone(&calls);
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            let cancel = CancellationToken::new();
            CreateCompanyHandler.handle(cmd, &cancel).await
        }
    })
}

/// Counts entries and never calls `next`.
struct Halt(Arc<AtomicUsize>);

impl<C: Command> Behavior<C> for Halt {
    fn handle<'a>(&'a self, _cmd: C, _next: Next<'a, C>) -> BoxFuture<'a, DispatchResult<C>> {
        Box::pin(async move {
            self.0.fetch_add(1, Ordering::SeqCst);
            Err(DispatchError::Behavior { behavior: "halt", reason: "simulated failure".into() })
        })
    }
}

/// Counts entries and passes through.
struct Count(Arc<AtomicUsize>);

impl<C: Command> Behavior<C> for Count {
    fn handle<'a>(&'a self, cmd: C, next: Next<'a, C>) -> BoxFuture<'a, DispatchResult<C>> {
        Box::pin(async move {
            self.0.fetch_add(1, Ordering::SeqCst);
            next.run(cmd).await
        })
    }
}

#[tokio::test]
async fn key_then_hash_enrich_the_command() {
    let mediator = Mediator::builder()
        .register(Pipeline::<CreateCompany>::new(CreateCompanyHandler).behavior(AddKey).behavior(AddHash))
        .build();

    let out = mediator.send(command("Acme")).await.unwrap();

    assert!(Regex::new(r"^123456789-.{20}$").unwrap().is_match(&out.key), "key: {}", out.key);
    let hash = Uuid::parse_str(&out.hash).unwrap();
    assert_eq!(hash.hyphenated().to_string(), out.hash);
    assert_ne!(out.key, out.hash);
}

#[tokio::test]
async fn name_and_address_pass_through_verbatim() {
    let input = CreateCompany {
        name: "  Ünïcode & Sons ".into(),
        address: "".into(),
        key: String::new(),
        hash: String::new(),
    };
    let out = company::mediator().send(input.clone()).await.unwrap();

    assert_eq!(out.name, input.name);
    assert_eq!(out.address, input.address);
}

#[tokio::test]
async fn same_input_yields_fresh_values() {
    let mediator = company::mediator();
    let a = mediator.send(command("Acme")).await.unwrap();
    let b = mediator.send(command("Acme")).await.unwrap();

    assert_eq!((&a.name, &a.address), (&b.name, &b.address));
    assert_ne!(a.id, b.id);
    assert_ne!(a.key, b.key);
    assert_ne!(a.hash, b.hash);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_dispatches_run_the_handler_once_each() {
    const N: usize = 64;

    let calls = Arc::new(AtomicUsize::new(0));
    let mediator = Arc::new(
        Mediator::builder()
            .register(
                Pipeline::new(counted(Arc::clone(&calls)))
                    .behavior(AddKey)
                    .behavior(AddHash),
            )
            .build(),
    );

    let handles: Vec<_> = (0..N)
        .map(|i| {
            let mediator = Arc::clone(&mediator);
            tokio::spawn(async move { mediator.send(command(&format!("c{i}"))).await })
        })
        .collect();

    let mut outputs: Vec<CompanyCreated> = Vec::with_capacity(N);
    for handle in handles {
        outputs.push(handle.await.unwrap().unwrap());
    }

    assert_eq!(calls.load(Ordering::SeqCst), N);
    let ids: HashSet<Uuid> = outputs.iter().map(|o| o.id).collect();
    assert_eq!(ids.len(), N);
    for (i, out) in outputs.iter().enumerate() {
        assert_eq!(out.name, format!("c{i}"));
    }
}

#[tokio::test]
async fn halted_chain_never_reaches_downstream_or_handler() {
    let calls = Arc::new(AtomicUsize::new(0));
    let halted = Arc::new(AtomicUsize::new(0));
    let downstream = Arc::new(AtomicUsize::new(0));
    let mediator = Mediator::builder()
        .register(
            Pipeline::new(counted(Arc::clone(&calls)))
                .behavior(AddKey)
                .behavior(Halt(Arc::clone(&halted)))
                .behavior(Count(Arc::clone(&downstream))),
        )
        .build();

    let err = mediator.send(command("Acme")).await.unwrap_err();

    assert!(matches!(err, DispatchError::Behavior { behavior: "halt", .. }));
    assert_eq!(halted.load(Ordering::SeqCst), 1);
    assert_eq!(downstream.load(Ordering::SeqCst), 0);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unregistered_command_runs_nothing() {
    struct Audit;
    impl Command for Audit {
        type Output = ();
    }

    let entered = Arc::new(AtomicUsize::new(0));
    let mediator = Mediator::builder()
        .register(Pipeline::<CreateCompany>::new(CreateCompanyHandler).behavior(Count(Arc::clone(&entered))))
        .build();

    let err = mediator.send(Audit).await.unwrap_err();

    assert!(matches!(err, DispatchError::NoHandlerRegistered { .. }));
    assert_eq!(entered.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn cancelled_dispatch_skips_every_stage() {
    let calls = Arc::new(AtomicUsize::new(0));
    let entered = Arc::new(AtomicUsize::new(0));
    let mediator = Mediator::builder()
        .register(Pipeline::new(counted(Arc::clone(&calls))).behavior(Count(Arc::clone(&entered))))
        .build();

    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = mediator.send_cancellable(command("Acme"), &cancel).await.unwrap_err();

    assert!(matches!(err, DispatchError::Cancelled));
    assert_eq!(entered.load(Ordering::SeqCst), 0);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}
