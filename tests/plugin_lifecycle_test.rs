use daterange_marks::core::plugin::Lifecycle;
use daterange_marks::{
    DateRangeError, DateRangePlugin, MemoryCalendar, PluginEvent, PluginHooks, PluginOptions,
    RangeInput,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn plugin() -> DateRangePlugin<MemoryCalendar> {
    DateRangePlugin::new(MemoryCalendar::new(), PluginOptions::default())
}

fn immediate_plugin() -> DateRangePlugin<MemoryCalendar> {
    let options = PluginOptions {
        batch_update_delay_ms: 0,
        ..Default::default()
    };
    DateRangePlugin::new(MemoryCalendar::new(), options)
}

#[test]
fn test_single_day_range_installs_one_mark() {
    let mut plugin = immediate_plugin();
    plugin
        .add(RangeInput::new("a", "Alpha", "2024-03-01", "2024-03-01"))
        .unwrap();

    let host = plugin.host();
    assert_eq!(host.mark_count(), 1);
    let mark = host.mark("a_2024-03-01").unwrap();
    assert_eq!(mark.position(), Some(daterange_marks::domain::model::Position::Single));
    assert_eq!(plugin.get_info().mark_count, 1);
}

#[test]
fn test_duplicate_code_is_rejected() {
    let mut plugin = plugin();
    plugin
        .add(RangeInput::new("x", "First", "2024-03-01", "2024-03-03"))
        .unwrap();

    let err = plugin
        .add(RangeInput::new("x", "Second", "2024-04-01", "2024-04-03"))
        .unwrap_err();

    assert!(matches!(err, DateRangeError::DuplicateCodeError { ref code } if code == "x"));
    assert_eq!(plugin.get_info().range_count, 1);
    assert_eq!(plugin.get_range("x").unwrap().name, "First");
}

#[test]
fn test_invalid_input_is_rejected_without_side_effects() {
    let mut plugin = plugin();

    let mut missing_name = RangeInput::new("a", "", "2024-03-01", "2024-03-02");
    missing_name.name = None;
    let err = plugin.add(missing_name).unwrap_err();
    assert!(err.to_string().contains("must have a name property"));

    let err = plugin
        .add(RangeInput::new("b", "Backwards", "2024-03-05", "2024-03-01"))
        .unwrap_err();
    assert!(err.to_string().contains("startDate must be before or equal to endDate"));

    assert_eq!(plugin.get_info().range_count, 0);
    assert!(!plugin.has_pending_tasks());
}

#[test]
fn test_remove_missing_code_returns_false() {
    let mut plugin = immediate_plugin();
    plugin
        .add(RangeInput::new("a", "Alpha", "2024-03-01", "2024-03-02"))
        .unwrap();

    assert!(!plugin.remove("nonexistent"));
    assert_eq!(plugin.get_info().range_count, 1);
    assert!(!plugin
        .host()
        .triggered_names()
        .contains(&"dateRange:rangeRemoved"));

    assert!(plugin.remove("a"));
    assert_eq!(plugin.host().mark_count(), 0);
    assert!(plugin
        .host()
        .triggered_names()
        .contains(&"dateRange:rangeRemoved"));
}

#[test]
fn test_refresh_is_debounced() {
    let mut plugin = plugin();
    plugin
        .add(RangeInput::new("a", "Alpha", "2024-03-01", "2024-03-03"))
        .unwrap();
    plugin.advance(ms(60));
    plugin
        .add(RangeInput::new("b", "Beta", "2024-03-02", "2024-03-04"))
        .unwrap();
    plugin
        .add(RangeInput::new("c", "Gamma", "2024-03-10", "2024-03-10"))
        .unwrap();

    // 每次異動都重設計時器
    plugin.advance(ms(60));
    assert_eq!(plugin.host().add_calls(), 0);

    plugin.advance(ms(40));
    assert_eq!(plugin.host().add_calls(), 1);
    assert_eq!(plugin.host().mark_count(), 7);
    assert!(!plugin.has_pending_tasks());
}

#[test]
fn test_refresh_is_idempotent() {
    let mut plugin = immediate_plugin();
    plugin
        .load(&[
            RangeInput::new("a", "Alpha", "2024-03-01", "2024-03-05"),
            RangeInput::new("b", "Beta", "2024-03-04", "2024-03-08"),
        ])
        .unwrap();

    let first: Vec<_> = plugin.host().marks().cloned().collect();
    plugin.refresh();
    plugin.refresh();
    let second: Vec<_> = plugin.host().marks().cloned().collect();

    assert_eq!(first, second);
    assert_eq!(plugin.marks().len(), 10);
    assert_eq!(plugin.get_info().mark_count, 10);
}

#[test]
fn test_ranges_for_date_match_range_contents() {
    let mut plugin = plugin();
    plugin
        .load(&[
            RangeInput::new("a", "Alpha", "2024-03-01", "2024-03-05"),
            RangeInput::new("b", "Beta", "2024-03-04", "2024-03-08"),
        ])
        .unwrap();

    let codes = |date: &str| -> Vec<String> {
        plugin
            .get_ranges_for_date(date)
            .into_iter()
            .map(|range| range.code.clone())
            .collect()
    };

    assert_eq!(codes("2024-03-01"), vec!["a"]);
    assert_eq!(codes("2024-03-04"), vec!["a", "b"]);
    assert_eq!(codes("2024/03/08"), vec!["b"]);
    assert!(codes("2024-03-09").is_empty());
    assert!(codes("not a date").is_empty());

    assert!(plugin.is_date_in_range("2024-03-05", "a"));
    assert!(!plugin.is_date_in_range("2024-03-06", "a"));
    assert!(!plugin.is_date_in_range("2024-03-06", "missing"));
    assert_eq!(plugin.get_info().date_count, 8);
}

#[test]
fn test_load_is_all_or_nothing() {
    let mut plugin = immediate_plugin();
    plugin
        .add(RangeInput::new("keep", "Keep", "2024-03-01", "2024-03-01"))
        .unwrap();

    let err = assert_err!(plugin.load(&[
        RangeInput::new("a", "Alpha", "2024-03-01", "2024-03-05"),
        RangeInput::new("b", "Beta", "2024-03-xx", "2024-03-08"),
    ]));

    assert!(err.to_string().contains("Range at index 1"));
    assert!(plugin.get_range("keep").is_some());
    assert!(plugin.get_range("a").is_none());
}

#[test]
fn test_update_merges_patch() {
    let mut plugin = immediate_plugin();
    plugin
        .add(RangeInput::new("a", "Alpha", "2024-03-01", "2024-03-02").with_color("#ff0000"))
        .unwrap();

    let patch = RangeInput {
        end_date: Some("2024-03-04".to_string()),
        ..Default::default()
    };
    plugin.update("a", patch).unwrap();

    let range = plugin.get_range("a").unwrap();
    assert_eq!(range.name, "Alpha");
    assert_eq!(range.color.as_deref(), Some("#ff0000"));
    assert_eq!(plugin.host().mark_count(), 4);
    assert!(plugin.host().mark("a_2024-03-04").is_some());

    let err = plugin.update("missing", RangeInput::default()).unwrap_err();
    assert!(matches!(err, DateRangeError::NotFoundError { .. }));
}

#[test]
fn test_clear_removes_all_marks() {
    let mut plugin = immediate_plugin();
    plugin
        .add(RangeInput::new("a", "Alpha", "2024-03-01", "2024-03-05"))
        .unwrap();

    plugin.clear();

    assert_eq!(plugin.get_info().range_count, 0);
    assert_eq!(plugin.host().mark_count(), 0);
    assert!(plugin.marks().is_empty());
}

#[test]
fn test_pause_defers_refresh_until_resume() {
    let mut plugin = plugin();
    plugin.pause();
    assert!(plugin.is_paused());

    plugin
        .add(RangeInput::new("a", "Alpha", "2024-03-01", "2024-03-03"))
        .unwrap();
    plugin.advance(ms(1_000));

    // 資料已寫入，但沒有安裝任何標記
    assert_eq!(plugin.get_info().range_count, 1);
    assert_eq!(plugin.host().mark_count(), 0);

    plugin.resume();
    assert_eq!(plugin.lifecycle(), Lifecycle::Active);
    assert_eq!(plugin.host().mark_count(), 3);
}

#[test]
fn test_destroy_is_terminal() {
    let mut plugin = immediate_plugin();
    plugin
        .add(RangeInput::new("a", "Alpha", "2024-03-01", "2024-03-03"))
        .unwrap();
    assert!(plugin.host().is_subscribed("markClick"));

    plugin.destroy();

    assert!(plugin.is_destroyed());
    assert_eq!(plugin.host().mark_count(), 0);
    assert!(!plugin.host().is_subscribed("markClick"));
    assert!(!plugin.host().is_subscribed("dateClick"));

    // 銷毀後所有操作皆為 no-op
    assert_ok!(plugin.add(RangeInput::new("b", "Beta", "2024-03-01", "2024-03-03")));
    assert!(!plugin.remove("a"));
    plugin.refresh();
    plugin.resume();
    plugin.destroy();

    assert_eq!(plugin.host().mark_count(), 0);
    assert!(plugin.get_info().is_destroyed);
    let destroyed = plugin
        .host()
        .triggered_names()
        .into_iter()
        .filter(|name| *name == "dateRange:destroyed")
        .count();
    assert_eq!(destroyed, 1);
}

#[test]
fn test_mark_click_resolves_range() {
    let clicks = Rc::new(RefCell::new(Vec::new()));
    let recorded = Rc::clone(&clicks);
    let hooks = PluginHooks::new().on_range_click(move |event| {
        recorded
            .borrow_mut()
            .push((event.code.clone(), event.date.clone()));
    });

    let mut plugin = immediate_plugin().with_hooks(hooks);
    plugin
        .add(
            RangeInput::new("a", "Alpha", "2024-03-01", "2024-03-03")
                .with_data(serde_json::json!({"owner": "ops"})),
        )
        .unwrap();
    plugin
        .add(RangeInput::new("quiet", "Quiet", "2024-03-01", "2024-03-01").with_clickable(false))
        .unwrap();

    let mut events = plugin.subscribe();

    plugin.handle_mark_click("a_2024-03-02");
    plugin.handle_mark_click("quiet_2024-03-01");
    plugin.handle_mark_click("unknown_2024-03-01");

    assert_eq!(
        *clicks.borrow(),
        vec![("a".to_string(), "2024-03-02".to_string())]
    );

    match events.try_recv().unwrap() {
        PluginEvent::RangeClick(event) => {
            assert_eq!(event.mark_key, "a_2024-03-02");
            assert_eq!(event.data.unwrap()["owner"], "ops");
        }
        other => panic!("unexpected event: {:?}", other),
    }
    assert!(events.try_recv().is_err());
}

#[test]
fn test_date_click_lists_overlapping_ranges() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let recorded = Rc::clone(&seen);
    let hooks = PluginHooks::new().on_date_click(move |event| {
        recorded.borrow_mut().push(event.ranges.len());
    });

    let mut plugin = plugin().with_hooks(hooks);
    plugin
        .load(&[
            RangeInput::new("a", "Alpha", "2024-03-01", "2024-03-05"),
            RangeInput::new("b", "Beta", "2024-03-04", "2024-03-08"),
        ])
        .unwrap();

    plugin.handle_date_click("2024-03-04");
    plugin.handle_date_click("2024-03-20");
    plugin.handle_date_click("garbage");

    assert_eq!(*seen.borrow(), vec![2, 0]);
    assert!(plugin
        .host()
        .triggered_names()
        .contains(&"dateRange:dateClick"));
}

#[test]
fn test_removed_range_is_not_resolved_before_refresh() {
    let mut plugin = plugin();
    plugin
        .add(RangeInput::new("a", "Alpha", "2024-03-01", "2024-03-02"))
        .unwrap();
    plugin.advance(ms(100));

    let mut events = plugin.subscribe();
    plugin.remove("a");
    plugin.handle_mark_click("a_2024-03-01");

    assert!(matches!(
        events.try_recv().unwrap(),
        PluginEvent::RangeRemoved { .. }
    ));
    assert!(events.try_recv().is_err());
}

#[test]
fn test_host_rejection_emits_error_event() {
    let mut host = MemoryCalendar::new();
    host.reject_next_add("calendar not ready");
    let options = PluginOptions {
        batch_update_delay_ms: 0,
        ..Default::default()
    };
    let mut plugin = DateRangePlugin::new(host, options);

    plugin
        .add(RangeInput::new("a", "Alpha", "2024-03-01", "2024-03-02"))
        .unwrap();

    let (name, event) = plugin
        .host()
        .triggered()
        .iter()
        .find(|(name, _)| name == "dateRange:error")
        .cloned()
        .unwrap();
    assert_eq!(name, "dateRange:error");
    match event {
        PluginEvent::Error { action, message } => {
            assert_eq!(action, "refresh");
            assert!(message.contains("calendar not ready"));
        }
        other => panic!("unexpected event: {:?}", other),
    }

    // 下一次 refresh 正常安裝
    plugin.refresh();
    assert_eq!(plugin.host().mark_count(), 2);
}

#[test]
fn test_hooks_fire_on_add_and_remove() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let added = Rc::clone(&log);
    let removed = Rc::clone(&log);
    let hooks = PluginHooks::new()
        .on_range_add(move |range| added.borrow_mut().push(format!("add:{}", range.code)))
        .on_range_remove(move |code, _| removed.borrow_mut().push(format!("remove:{}", code)));

    let mut plugin = plugin().with_hooks(hooks);
    plugin
        .add(RangeInput::new("a", "Alpha", "2024-03-01", "2024-03-02"))
        .unwrap();
    plugin.remove("a");
    plugin.remove("a");

    assert_eq!(*log.borrow(), vec!["add:a", "remove:a"]);
}

fn chunked_plugin() -> DateRangePlugin<MemoryCalendar> {
    let options = PluginOptions {
        chunked_load: true,
        max_ranges_per_batch: 2,
        batch_update_delay_ms: 100,
        ..Default::default()
    };
    DateRangePlugin::new(MemoryCalendar::new(), options)
}

fn daily_inputs(count: u32) -> Vec<RangeInput> {
    (1..=count)
        .map(|day| {
            let date = format!("2024-03-{:02}", day);
            RangeInput::new(&format!("r{}", day), "Day", &date, &date)
        })
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_chunked_load_installs_in_batches() {
    let mut plugin = chunked_plugin();
    let inputs = daily_inputs(5);

    assert_eq!(plugin.load(&inputs).unwrap(), 5);
    // 全部範圍立即進入 store，只有安裝到宿主是分批的
    assert_eq!(plugin.get_info().range_count, 5);
    assert!(plugin.get_range("r5").is_some());
    assert_eq!(plugin.host().mark_count(), 2);
    assert!(plugin.has_pending_tasks());

    plugin.run_pending().await;

    assert_eq!(plugin.get_info().range_count, 5);
    assert_eq!(plugin.host().mark_count(), 5);
    assert_eq!(plugin.host().add_calls(), 3);
    assert!(!plugin.has_pending_tasks());
}

#[tokio::test(start_paused = true)]
async fn test_run_pending_flushes_debounced_refresh() {
    let mut plugin = plugin();
    plugin
        .add(RangeInput::new("a", "Alpha", "2024-03-01", "2024-03-02"))
        .unwrap();
    assert_eq!(plugin.host().mark_count(), 0);

    plugin.run_pending().await;
    assert_eq!(plugin.host().mark_count(), 2);
}

#[test]
fn test_non_clickable_plugin_does_not_bind_host_events() {
    let options = PluginOptions {
        clickable: false,
        ..Default::default()
    };
    let plugin = DateRangePlugin::new(MemoryCalendar::new(), options);

    assert!(!plugin.host().is_subscribed("markClick"));
    assert!(!plugin.host().is_subscribed("dateClick"));
}

#[test]
fn test_remove_during_chunked_load_is_final() {
    let mut plugin = chunked_plugin();
    plugin.load(&daily_inputs(5)).unwrap();

    assert!(plugin.remove("r4"));
    assert!(plugin.get_range("r4").is_none());

    plugin.advance(ms(1_000));
    assert!(plugin.get_range("r4").is_none());
    assert_eq!(plugin.get_info().range_count, 4);
    assert!(plugin.host().mark("r4_2024-03-04").is_none());
    assert_eq!(plugin.host().mark_count(), 4);
}

#[test]
fn test_update_during_chunked_load_finds_range() {
    let mut plugin = chunked_plugin();
    plugin.load(&daily_inputs(5)).unwrap();

    let patch = RangeInput {
        name: Some("Renamed".to_string()),
        ..Default::default()
    };
    assert_ok!(plugin.update("r4", patch));

    plugin.advance(ms(1_000));
    assert_eq!(plugin.get_range("r4").unwrap().name, "Renamed");
    assert_eq!(plugin.host().mark("r4_2024-03-04").unwrap().text, "Renamed");
    assert_eq!(plugin.host().mark_count(), 5);
}

#[test]
fn test_add_during_chunked_load_rejects_loaded_code() {
    let mut plugin = chunked_plugin();
    plugin.load(&daily_inputs(5)).unwrap();

    let err = assert_err!(plugin.add(RangeInput::new("r4", "Other", "2024-04-01", "2024-04-01")));
    assert!(matches!(err, DateRangeError::DuplicateCodeError { .. }));

    plugin.advance(ms(1_000));
    let range = plugin.get_range("r4").unwrap();
    assert_eq!(range.name, "Day");
    assert_eq!(plugin.get_info().range_count, 5);
}

#[test]
fn test_pause_during_chunked_load_stops_batches() {
    let mut plugin = chunked_plugin();
    plugin.load(&daily_inputs(5)).unwrap();
    assert_eq!(plugin.host().mark_count(), 2);

    plugin.pause();
    assert!(!plugin.has_pending_tasks());

    plugin.advance(ms(1_000));
    assert_eq!(plugin.host().mark_count(), 2);
    assert_eq!(plugin.get_info().range_count, 5);

    plugin.resume();
    assert_eq!(plugin.host().mark_count(), 5);
    assert!(!plugin.has_pending_tasks());
}

#[test]
fn test_chunked_load_while_paused_schedules_nothing() {
    let mut plugin = chunked_plugin();
    plugin.pause();

    assert_eq!(plugin.load(&daily_inputs(5)).unwrap(), 5);
    assert!(plugin.is_paused());
    assert!(!plugin.has_pending_tasks());
    assert_eq!(plugin.get_info().range_count, 5);
    assert_eq!(plugin.host().mark_count(), 0);

    plugin.resume();
    assert_eq!(plugin.host().mark_count(), 5);
    assert_eq!(plugin.host().add_calls(), 1);
}
