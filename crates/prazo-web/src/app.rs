use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use chrono::{
  Local,
  Utc
};
use gloo::timers::callback::{
  Interval,
  Timeout
};
use prazo_core::clock::format_clock;
use prazo_core::monitor::DEFAULT_TICK;
use prazo_core::reminder::DEFAULT_BANNER_DURATION;
use prazo_core::theme::{
  load_theme,
  save_theme
};
use prazo_core::{
  DeadlineMonitor,
  Lifecycle,
  MoveOutcome,
  ReminderSurface,
  Stage,
  TaskDraft,
  TaskId,
  TimeUnit
};
use web_sys::{
  Event,
  HtmlInputElement,
  HtmlSelectElement,
  InputEvent,
  KeyboardEvent,
  MouseEvent
};
use yew::{
  Callback,
  Html,
  TargetCast,
  UseForceUpdateHandle,
  classes,
  function_component,
  html,
  use_effect_with,
  use_force_update,
  use_mut_ref,
  use_state
};

use crate::audio::play_cue;
use crate::components::{
  InfoOverlay,
  ReminderBanner,
  StageColumn
};
use crate::storage::LocalStorage;

const CLOCK_PERIOD_MS: u32 = 1_000;

const ABOUT_TEXT: &str =
  "Prazo keeps a three-stage task \
   list. Every task carries a \
   deadline; once it passes, a \
   reminder is shown once and a \
   short sound plays.";
const CONTACT_TEXT: &str =
  "Questions and bug reports: open \
   an issue in the project \
   repository.";

type SharedLifecycle =
  Rc<RefCell<Lifecycle<LocalStorage>>>;

/// Monitor schedule and banner state
/// shared by the interval callbacks.
#[derive(Default)]
struct Reminders {
  monitor:    DeadlineMonitor,
  surface:    ReminderSurface,
  hide_timer: Option<Timeout>
}

type SharedReminders =
  Rc<RefCell<Reminders>>;

fn millis(duration: Duration) -> u32 {
  u32::try_from(duration.as_millis())
    .unwrap_or(u32::MAX)
}

fn today() -> String {
  Local::now()
    .format("%Y-%m-%d")
    .to_string()
}

fn run_deadline_check(
  lifecycle: &SharedLifecycle,
  reminders: &SharedReminders,
  refresh: &UseForceUpdateHandle
) {
  let now = Utc::now();
  let raised = {
    let mut reminders =
      reminders.borrow_mut();
    lifecycle
      .borrow_mut()
      .check_deadlines(
        &mut reminders.monitor,
        now
      )
  };

  if raised.is_empty() {
    return;
  }

  for notification in &raised {
    reminders
      .borrow_mut()
      .surface
      .show(notification, now);
    play_cue();
  }

  // A newer banner restarts the
  // window; dropping the old timer
  // cancels it.
  let timer = {
    let reminders = reminders.clone();
    let refresh = refresh.clone();
    Timeout::new(
      millis(DEFAULT_BANNER_DURATION),
      move || {
        let hidden = reminders
          .borrow_mut()
          .surface
          .expire(Utc::now());
        tracing::debug!(
          hidden,
          "reminder banner timer fired"
        );
        refresh.force_update();
      }
    )
  };
  reminders.borrow_mut().hide_timer =
    Some(timer);

  tracing::info!(
    raised = raised.len(),
    "overdue tasks notified"
  );
  refresh.force_update();
}

#[function_component(App)]
pub fn app() -> Html {
  let lifecycle: SharedLifecycle =
    use_mut_ref(|| {
      Lifecycle::open(LocalStorage::new())
    });
  let reminders: SharedReminders =
    use_mut_ref(Reminders::default);
  let refresh = use_force_update();

  let theme = {
    let lifecycle = lifecycle.clone();
    use_state(move || {
      load_theme(
        lifecycle.borrow().backend()
      )
    })
  };
  let clock = use_state(|| {
    format_clock(&Local::now())
  });
  let text = use_state(String::new);
  let date = use_state(today);
  let amount = use_state(String::new);
  let unit = use_state(|| {
    TimeUnit::Minutes
      .as_str()
      .to_string()
  });
  let about_open = use_state(|| false);
  let contact_open =
    use_state(|| false);

  {
    let clock = clock.clone();
    use_effect_with((), move |_| {
      let interval = Interval::new(
        CLOCK_PERIOD_MS,
        move || {
          clock.set(format_clock(
            &Local::now()
          ));
        }
      );
      move || drop(interval)
    });
  }

  {
    let lifecycle = lifecycle.clone();
    let reminders = reminders.clone();
    let refresh = refresh.clone();
    use_effect_with((), move |_| {
      run_deadline_check(
        &lifecycle, &reminders,
        &refresh
      );
      let interval = Interval::new(
        millis(DEFAULT_TICK),
        move || {
          run_deadline_check(
            &lifecycle, &reminders,
            &refresh
          );
        }
      );
      move || drop(interval)
    });
  }

  let on_text_input = {
    let text = text.clone();
    Callback::from(
      move |event: InputEvent| {
        let input: HtmlInputElement =
          event.target_unchecked_into();
        text.set(input.value());
      }
    )
  };

  let on_date_input = {
    let date = date.clone();
    Callback::from(
      move |event: InputEvent| {
        let input: HtmlInputElement =
          event.target_unchecked_into();
        date.set(input.value());
      }
    )
  };

  let on_amount_input = {
    let amount = amount.clone();
    Callback::from(
      move |event: InputEvent| {
        let input: HtmlInputElement =
          event.target_unchecked_into();
        amount.set(input.value());
      }
    )
  };

  let on_unit_change = {
    let unit = unit.clone();
    Callback::from(move |event: Event| {
      let select: HtmlSelectElement =
        event.target_unchecked_into();
      unit.set(select.value());
    })
  };

  let add_task = {
    let lifecycle = lifecycle.clone();
    let text = text.clone();
    let date = date.clone();
    let amount = amount.clone();
    let unit = unit.clone();
    let refresh = refresh.clone();
    Callback::from(move |_: ()| {
      let draft = TaskDraft {
        text:          (*text).clone(),
        deadline_date: (*date).clone(),
        amount:        (*amount).clone(),
        unit:          (*unit).clone()
      };
      let created = lifecycle
        .borrow_mut()
        .create_task(&draft, Utc::now());

      match created {
        | Ok(record) => {
          tracing::info!(
            id = %record.id,
            "task added"
          );
          text.set(String::new());
          date.set(today());
          amount.set(String::new());
          refresh.force_update();
        }
        | Err(err) => {
          tracing::debug!(
            error = %err,
            "task input ignored"
          );
        }
      }
    })
  };

  let on_add_click = {
    let add_task = add_task.clone();
    Callback::from(
      move |_: MouseEvent| {
        add_task.emit(());
      }
    )
  };

  let on_text_keydown = {
    let add_task = add_task.clone();
    Callback::from(
      move |event: KeyboardEvent| {
        if event.key() == "Enter" {
          add_task.emit(());
        }
      }
    )
  };

  let on_move = {
    let lifecycle = lifecycle.clone();
    let refresh = refresh.clone();
    Callback::from(
      move |(id, stage): (TaskId, Stage)| {
        let outcome = lifecycle
          .borrow_mut()
          .move_task(id, stage);
        if let MoveOutcome::Moved(next) =
          outcome
        {
          tracing::debug!(
            id = %id,
            to = %next,
            "task moved"
          );
          refresh.force_update();
        }
      }
    )
  };

  let on_remove = {
    let lifecycle = lifecycle.clone();
    let refresh = refresh.clone();
    Callback::from(
      move |(id, stage): (TaskId, Stage)| {
        lifecycle
          .borrow_mut()
          .remove_task(id, stage);
        refresh.force_update();
      }
    )
  };

  let on_toggle_theme = {
    let lifecycle = lifecycle.clone();
    let theme = theme.clone();
    Callback::from(
      move |_: MouseEvent| {
        let next = (*theme).toggle();
        if let Err(err) = save_theme(
          lifecycle
            .borrow_mut()
            .backend_mut(),
          next
        ) {
          tracing::error!(
            error = %err,
            "failed to persist theme"
          );
        }
        theme.set(next);
      }
    )
  };

  let open_about = {
    let about_open = about_open.clone();
    Callback::from(
      move |_: MouseEvent| {
        about_open.set(true);
      }
    )
  };
  let close_about = {
    let about_open = about_open.clone();
    Callback::from(move |_: ()| {
      about_open.set(false);
    })
  };
  let open_contact = {
    let contact_open =
      contact_open.clone();
    Callback::from(
      move |_: MouseEvent| {
        contact_open.set(true);
      }
    )
  };
  let close_contact = {
    let contact_open =
      contact_open.clone();
    Callback::from(move |_: ()| {
      contact_open.set(false);
    })
  };

  let now = Utc::now();
  let dark = theme.is_dark();
  let dark_class =
    dark.then_some("dark-mode");
  let banner = reminders
    .borrow()
    .surface
    .visible(now)
    .map(str::to_string);

  let columns = {
    let lifecycle = lifecycle.borrow();
    Stage::ALL
      .into_iter()
      .map(|stage| {
        html! {
          <StageColumn
            key={stage.key()}
            stage={stage}
            tasks={lifecycle.registry().stage(stage).to_vec()}
            now={now}
            dark={dark}
            on_move={on_move.clone()}
            on_remove={on_remove.clone()}
          />
        }
      })
      .collect::<Html>()
  };

  html! {
    <div class={classes!("app", dark_class)}>
      <header class={classes!(dark_class)}>
        <h1>{ "Prazo" }</h1>
        <div id="clock" class="clock">{ (*clock).clone() }</div>
        <nav>
          <button id="aboutButton" onclick={open_about}>{ "About" }</button>
          <button id="contactButton" onclick={open_contact}>{ "Contact" }</button>
          <button id="themeToggle" onclick={on_toggle_theme}>
            { if dark { "Light mode" } else { "Dark mode" } }
          </button>
        </nav>
      </header>

      <main class={classes!("container", dark_class)}>
        <div class="task-input">
          <input
            id="taskInput"
            type="text"
            placeholder="New task"
            class={classes!(dark_class)}
            value={(*text).clone()}
            oninput={on_text_input}
            onkeydown={on_text_keydown}
          />
          <input
            id="taskDate"
            type="date"
            class={classes!(dark_class)}
            value={(*date).clone()}
            oninput={on_date_input}
          />
          <input
            id="taskTimer"
            type="number"
            min="1"
            placeholder="Timer"
            class={classes!(dark_class)}
            value={(*amount).clone()}
            oninput={on_amount_input}
          />
          <select
            id="timeUnit"
            class={classes!(dark_class)}
            onchange={on_unit_change}
          >
            {
              for TimeUnit::ALL.into_iter().map(|option| {
                html! {
                  <option
                    value={option.as_str()}
                    selected={option.as_str() == unit.as_str()}
                  >
                    { option.as_str() }
                  </option>
                }
              })
            }
          </select>
          <button id="addTaskButton" onclick={on_add_click}>{ "Add" }</button>
        </div>

        <div class="board">
          { columns }
        </div>
      </main>

      <ReminderBanner message={banner} />

      <InfoOverlay title="About" open={*about_open} on_close={close_about}>
        <p>{ ABOUT_TEXT }</p>
      </InfoOverlay>
      <InfoOverlay title="Contact" open={*contact_open} on_close={close_contact}>
        <p>{ CONTACT_TEXT }</p>
      </InfoOverlay>
    </div>
  }
}
