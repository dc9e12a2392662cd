use std::cell::Cell;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};

use super::*;

struct Echo;

#[derive(Debug, Clone, Default, PartialEq)]
struct TextInput {
	text_input: String,
}

impl Mediate for Echo {
	type Capabilities = ();
	type Input = TextInput;
	type Content = String;

	fn content(&self, _: &(), input: &TextInput) -> String {
		input.text_input.clone()
	}
}

/// Formats a greeting with whatever salutation the owner injected.
struct Greeter;

struct Salutation(&'static str);

#[derive(Debug, Clone, Default, PartialEq)]
struct Profile {
	name: String,
	address: Address,
	visits: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Address {
	city: String,
}

impl Mediate for Greeter {
	type Capabilities = Salutation;
	type Input = Profile;
	type Content = String;

	fn content(&self, salutation: &Salutation, profile: &Profile) -> String {
		format!("{}, {} from {} ({})", salutation.0, profile.name, profile.address.city, profile.visits)
	}
}

#[fixture]
fn ctx() -> OwningContext {
	OwningContext::new()
}

fn echo(ctx: &OwningContext) -> Mediator<Echo> {
	Mediator::new(Echo, (), TextInput::default(), ctx.handle())
}

fn greeter(ctx: &OwningContext) -> Mediator<Greeter> {
	let profile = Profile {
		name: "Ada".to_string(),
		address: Address {
			city: "London".to_string(),
		},
		visits: 0,
	};
	Mediator::new(Greeter, Salutation("Hello"), profile, ctx.handle())
}

#[rstest]
fn hello_world_scenario(ctx: OwningContext) {
	let mediator = echo(&ctx);
	assert_eq!(mediator.content(), "");

	mediator.binding(field!(TextInput => text_input)).set("Hello World".to_string());

	assert_eq!(mediator.content(), "Hello World");
	assert_eq!(mediator.view(|content| content), "Hello World");
}

#[rstest]
fn set_then_get_on_owner_round_trips(ctx: OwningContext) {
	let mediator = greeter(&ctx);
	let visits = mediator.binding(field!(Profile => visits));

	assert_eq!(visits.get(), Some(0));
	visits.set(3);
	assert_eq!(visits.get(), Some(3));
	assert_eq!(ctx.pending(), 0);
}

#[rstest]
fn content_follows_every_write(ctx: OwningContext) {
	let mediator = greeter(&ctx);
	let name = mediator.binding(field!(Profile => name));
	let city = mediator.binding(field!(Profile => address.city));

	assert_eq!(mediator.content(), "Hello, Ada from London (0)");

	name.set("Grace".to_string());
	assert_eq!(mediator.content(), "Hello, Grace from London (0)");

	city.set("Arlington".to_string());
	assert_eq!(mediator.content(), "Hello, Grace from Arlington (0)");
	assert_eq!(mediator.with_input(|p| p.address.city.clone()), "Arlington");
}

#[test]
fn field_paths_are_dotted() {
	assert_eq!(field!(Profile => name).name(), "name");
	assert_eq!(field!(Profile => address.city).name(), "address.city");
}

#[rstest]
fn binding_carries_field_name(ctx: OwningContext) {
	let mediator = greeter(&ctx);
	assert_eq!(mediator.binding(field!(Profile => address.city)).field(), "address.city");
}

#[rstest]
fn view_calls_renderer_once(ctx: OwningContext) {
	let mediator = echo(&ctx);
	mediator.update_input("seed", |input| input.text_input = "label".to_string());

	let calls = Cell::new(0);
	let rendered = mediator.view(|content| {
		calls.set(calls.get() + 1);
		content.len()
	});

	assert_eq!(rendered, 5);
	assert_eq!(calls.get(), 1);
}

#[rstest]
fn view_propagates_renderer_errors(ctx: OwningContext) {
	let mediator = echo(&ctx);
	let result: Result<(), String> = mediator.view(|content| Err(format!("cannot render {content:?}")));
	assert_eq!(result, Err("cannot render \"\"".to_string()));
}

#[rstest]
fn capabilities_are_replaceable_by_owner(ctx: OwningContext) {
	let mediator = greeter(&ctx);
	mediator.set_capabilities(Salutation("Welcome back"));

	assert_eq!(mediator.with_capabilities(|s| s.0), "Welcome back");
	assert_eq!(mediator.content(), "Welcome back, Ada from London (0)");
	assert_eq!(mediator.version(), 1);
}

#[rstest]
fn update_input_commits_whole_record_writes(ctx: OwningContext) {
	let mediator = greeter(&ctx);
	mediator.update_input("visit", |profile| profile.visits += 1);
	mediator.update_input("visit", |profile| profile.visits += 1);

	assert_eq!(mediator.input().visits, 2);
	assert_eq!(mediator.version(), 2);
}

#[rstest]
fn subscribers_see_each_committed_version(ctx: OwningContext) {
	let mediator = echo(&ctx);
	let last = Arc::new(AtomicU64::new(0));
	let calls = Arc::new(AtomicUsize::new(0));

	let (l, c) = (Arc::clone(&last), Arc::clone(&calls));
	let _sub = mediator.subscribe(move |version| {
		l.store(version, Ordering::SeqCst);
		c.fetch_add(1, Ordering::SeqCst);
	});

	let text = mediator.binding(field!(TextInput => text_input));
	text.set("a".to_string());
	text.set("b".to_string());

	assert_eq!(calls.load(Ordering::SeqCst), 2);
	assert_eq!(last.load(Ordering::SeqCst), 2);
	assert_eq!(mediator.version(), 2);
}

#[rstest]
fn dropping_subscription_unsubscribes(ctx: OwningContext) {
	let mediator = echo(&ctx);
	let calls = Arc::new(AtomicUsize::new(0));

	let c = Arc::clone(&calls);
	let sub = mediator.subscribe(move |_| {
		c.fetch_add(1, Ordering::SeqCst);
	});
	assert_eq!(mediator.subscriber_count(), 1);

	mediator.update_input("first", |input| input.text_input.push('x'));
	drop(sub);
	mediator.update_input("second", |input| input.text_input.push('y'));

	assert_eq!(calls.load(Ordering::SeqCst), 1);
	assert_eq!(mediator.subscriber_count(), 0);
}

#[rstest]
fn subscriber_may_read_content(ctx: OwningContext) {
	let mediator = echo(&ctx);
	let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));

	let (weak, sink) = (mediator.downgrade(), Arc::clone(&seen));
	let _sub = mediator.subscribe(move |_| {
		if let Some(content) = weak.content() {
			sink.lock().push(content);
		}
	});

	let text = mediator.binding(field!(TextInput => text_input));
	text.set("one".to_string());
	text.set("two".to_string());

	assert_eq!(*seen.lock(), vec!["one".to_string(), "two".to_string()]);
}

#[rstest]
fn released_mediator_reads_none(ctx: OwningContext) {
	let mediator = echo(&ctx);
	let text = mediator.binding(field!(TextInput => text_input));
	let weak = mediator.downgrade();
	assert!(weak.is_alive());

	drop(mediator);

	assert_eq!(text.get(), None);
	assert_eq!(weak.content(), None);
	assert!(!weak.is_alive());
	text.set("ignored".to_string());
	weak.update_input("ignored", |input| input.text_input.clear());
}

#[rstest]
fn set_inside_with_input_is_queued(mut ctx: OwningContext) {
	let mediator = echo(&ctx);
	let text = mediator.binding(field!(TextInput => text_input));
	text.set("ready".to_string());

	mediator.with_input(|input| text.set(format!("{}!", input.text_input)));

	assert_eq!(mediator.content(), "ready");
	assert_eq!(ctx.pending(), 1);
	ctx.drain().unwrap();
	assert_eq!(mediator.content(), "ready!");
	assert_eq!(mediator.version(), 2);
}

#[rstest]
fn toggle_through_binding_read_in_place(mut ctx: OwningContext) {
	let mediator = Mediator::new(Greeter, Salutation("Hi"), Profile::default(), ctx.handle());
	let visits = mediator.binding(field!(Profile => visits));

	for _ in 0..3 {
		mediator.with_input(|profile| visits.set(profile.visits + 1));
		ctx.drain().unwrap();
	}

	assert_eq!(visits.get(), Some(3));
}

#[rstest]
fn set_capabilities_inside_with_capabilities_is_queued(mut ctx: OwningContext) {
	let mediator = greeter(&ctx);

	mediator.with_capabilities(|salutation| {
		let louder = if salutation.0 == "Hello" { "HELLO" } else { "Hello" };
		mediator.set_capabilities(Salutation(louder));
	});
	assert_eq!(mediator.with_capabilities(|s| s.0), "Hello");

	ctx.drain().unwrap();
	assert_eq!(mediator.content(), "HELLO, Ada from London (0)");
}

#[rstest]
fn write_inside_update_is_applied_after_it(mut ctx: OwningContext) {
	let mediator = greeter(&ctx);
	let name = mediator.binding(field!(Profile => name));

	mediator.update_input("visit", move |profile| {
		profile.visits += 1;
		name.set(format!("{} #{}", profile.name, profile.visits));
	});
	assert_eq!(mediator.version(), 1);

	ctx.drain().unwrap();
	assert_eq!(mediator.input().name, "Ada #1");
	assert_eq!(mediator.version(), 2);
}

#[rstest]
fn queued_write_waits_while_owner_reads(mut ctx: OwningContext) {
	let mediator = echo(&ctx);
	let text = mediator.binding(field!(TextInput => text_input));
	let worker = text.clone();
	std::thread::spawn(move || worker.set("late".to_string())).join().unwrap();

	let report = mediator.with_input(|_| ctx.drain_with(DrainBudget::UNBOUNDED).unwrap());
	assert_eq!(report.executed, 1);
	assert_eq!(report.pending, 1);
	assert_eq!(mediator.content(), "");

	ctx.drain().unwrap();
	assert_eq!(text.get().as_deref(), Some("late"));
}

#[rstest]
fn accessors_expose_model_and_context(ctx: OwningContext) {
	let mediator = greeter(&ctx);
	assert!(mediator.context().is_current());
	assert_eq!(mediator.context().name(), ctx.handle().name());
	assert_eq!(mediator.model().content(&Salutation("Hey"), &Profile::default()), "Hey,  from  (0)");
}

#[test]
fn constant_binding_ignores_writes() {
	let binding = Binding::constant(42);
	binding.set(7);
	assert_eq!(binding.get(), Some(42));
	assert_eq!(binding.field(), "constant");
}

#[test]
fn custom_binding_routes_through_closures() {
	let store = Arc::new(parking_lot::Mutex::new(String::from("draft")));
	let (r, w) = (Arc::clone(&store), Arc::clone(&store));
	let binding = Binding::new("note", move || Some(r.lock().clone()), move |v: String| *w.lock() = v);

	binding.set("final".to_string());
	assert_eq!(binding.get().as_deref(), Some("final"));
	assert!(format!("{binding:?}").contains("note"));
}

#[rstest]
fn debug_output_names_mediator(ctx: OwningContext) {
	let mediator = echo(&ctx);
	let debug = format!("{mediator:?}");
	assert!(debug.contains("Echo"), "got: {debug}");
	assert!(debug.contains("version: 0"), "got: {debug}");
}
