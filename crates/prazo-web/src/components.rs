use chrono::{
  DateTime,
  Utc
};
use prazo_core::clock::format_local;
use prazo_core::{
  Stage,
  TaskId,
  TaskRecord
};
use web_sys::MouseEvent;
use yew::{
  Callback,
  Html,
  Properties,
  classes,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct StageColumnProps {
  pub stage:     Stage,
  pub tasks:     Vec<TaskRecord>,
  pub now:       DateTime<Utc>,
  pub dark:      bool,
  pub on_move:   Callback<(TaskId, Stage)>,
  pub on_remove: Callback<(TaskId, Stage)>
}

#[function_component(StageColumn)]
pub fn stage_column(
  props: &StageColumnProps
) -> Html {
  let stage = props.stage;
  let terminal = stage.is_terminal();
  let dark_class =
    props.dark.then_some("dark-mode");

  html! {
    <section class={classes!("task-list", dark_class)}>
      <h2>{ stage.label() }</h2>
      <ul id={stage.storage_key()}>
        {
          for props.tasks.iter().map(|task| {
            let id = task.id;
            let on_move =
              props.on_move.clone();
            let on_remove =
              props.on_remove.clone();
            let overdue =
              task.is_overdue(props.now);
            html! {
              <li
                key={id.to_string()}
                class={classes!(
                  dark_class,
                  task.notified.then_some("notified"),
                  overdue.then_some("overdue")
                )}
              >
                <span class="text">{ task.text.clone() }</span>
                <span class="timestamp">{ format_local(task.created_at) }</span>
                <span class="deadline">
                  { format!("Prazo: {}", format_local(task.deadline)) }
                </span>
                <button
                  class="move-button"
                  disabled={terminal}
                  onclick={move |_| on_move.emit((id, stage))}
                >
                  { "→" }
                </button>
                <button
                  class="remove-button"
                  onclick={move |_| on_remove.emit((id, stage))}
                >
                  { "×" }
                </button>
              </li>
            }
          })
        }
      </ul>
    </section>
  }
}

#[derive(Properties, PartialEq)]
pub struct ReminderBannerProps {
  pub message: Option<String>
}

#[function_component(ReminderBanner)]
pub fn reminder_banner(
  props: &ReminderBannerProps
) -> Html {
  let shown = props.message.is_some();
  let text = match &props.message {
    | Some(message) => message.clone(),
    | None => String::new()
  };

  html! {
    <div
      id="reminder"
      class={classes!("reminder", shown.then_some("show"))}
    >
      { text }
    </div>
  }
}

#[derive(Properties, PartialEq)]
pub struct InfoOverlayProps {
  pub title:    String,
  pub open:     bool,
  pub on_close: Callback<()>,
  #[prop_or_default]
  pub children: Html
}

/// Modal dialog; a click on the
/// backdrop outside the dialog closes
/// it.
#[function_component(InfoOverlay)]
pub fn info_overlay(
  props: &InfoOverlayProps
) -> Html {
  if !props.open {
    return html! {};
  }

  let on_backdrop = {
    let on_close =
      props.on_close.clone();
    Callback::from(
      move |_: MouseEvent| {
        on_close.emit(());
      }
    )
  };
  let on_close_button = {
    let on_close =
      props.on_close.clone();
    Callback::from(
      move |_: MouseEvent| {
        on_close.emit(());
      }
    )
  };
  let on_dialog = Callback::from(
    |event: MouseEvent| {
      event.stop_propagation();
    }
  );

  html! {
    <div class="modal" onclick={on_backdrop}>
      <div class="modal-content" onclick={on_dialog}>
        <button class="close" onclick={on_close_button}>{ "×" }</button>
        <h2>{ props.title.clone() }</h2>
        { props.children.clone() }
      </div>
    </div>
  }
}
