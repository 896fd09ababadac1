use daydash_engine::WidgetId;
use daydash_engine::todo::{
  Priority,
  TodoFilter,
  TodoStats,
  TodoTask
};
use web_sys::{
  HtmlInputElement,
  HtmlSelectElement,
  KeyboardEvent,
  MouseEvent
};
use yew::{
  Callback,
  Html,
  Properties,
  TargetCast,
  classes,
  function_component,
  html,
  use_state
};

use crate::action::DashboardAction;

#[derive(Properties, PartialEq)]
pub struct TodoWidgetProps {
  pub id:        WidgetId,
  /// Already filtered and sorted.
  pub tasks:     Vec<TodoTask>,
  pub filter:    TodoFilter,
  pub stats:     TodoStats,
  pub on_action:
    Callback<DashboardAction>
}

#[function_component(TodoWidget)]
pub fn todo_widget(
  props: &TodoWidgetProps
) -> Html {
  let draft = use_state(String::new);
  let priority =
    use_state(Priority::default);

  let submit = {
    let id = props.id.clone();
    let on_action =
      props.on_action.clone();
    let draft = draft.clone();
    let priority = priority.clone();
    Callback::from(move |()| {
      if draft.trim().is_empty() {
        return;
      }
      on_action.emit(
        DashboardAction::TodoAdd {
          widget:   id.clone(),
          text:     (*draft).clone(),
          priority: *priority
        }
      );
      draft.set(String::new());
    })
  };

  let oninput = {
    let draft = draft.clone();
    Callback::from(
      move |event: web_sys::InputEvent| {
        let input: HtmlInputElement =
          event.target_unchecked_into();
        draft.set(input.value());
      }
    )
  };

  let onkeydown = {
    let submit = submit.clone();
    Callback::from(
      move |event: KeyboardEvent| {
        if event.key() == "Enter" {
          submit.emit(());
        }
      }
    )
  };

  let onchange = {
    let priority = priority.clone();
    Callback::from(
      move |event: web_sys::Event| {
        let select: HtmlSelectElement =
          event.target_unchecked_into();
        match select
          .value()
          .parse::<Priority>()
        {
          | Ok(parsed) => {
            priority.set(parsed)
          }
          | Err(error) => {
            tracing::warn!(
              %error,
              "ignoring priority choice"
            );
          }
        }
      }
    )
  };

  let on_add = {
    let submit = submit.clone();
    Callback::from(
      move |_: MouseEvent| {
        submit.emit(());
      }
    )
  };

  let on_clear = {
    let id = props.id.clone();
    let on_action =
      props.on_action.clone();
    Callback::from(
      move |_: MouseEvent| {
        on_action.emit(
          DashboardAction::TodoClearCompleted(
            id.clone()
          )
        );
      }
    )
  };

  html! {
    <div class="todo-container">
      <div class="todo-input-section">
        <input
          type="text"
          class="todo-input"
          placeholder="What needs to be done?"
          value={(*draft).clone()}
          {oninput}
          {onkeydown}
        />
        <div class="todo-options">
          <select class="todo-priority" {onchange}>
            {
              for [Priority::Low, Priority::Medium, Priority::High]
                .into_iter()
                .map(|option| html! {
                  <option
                    value={option.as_str()}
                    selected={*priority == option}
                  >
                    { priority_label(option) }
                  </option>
                })
            }
          </select>
          <button class="add-todo-btn" onclick={on_add}>{ "Add" }</button>
        </div>
      </div>
      <div class="todo-filters">
        {
          for TodoFilter::ALL.into_iter().map(|filter| {
            let id = props.id.clone();
            let on_action = props.on_action.clone();
            let active = filter == props.filter;
            html! {
              <button
                class={classes!("filter-btn", active.then_some("active"))}
                onclick={move |_: MouseEvent| {
                  on_action.emit(DashboardAction::TodoFilter(id.clone(), filter));
                }}
              >
                { filter.label() }
              </button>
            }
          })
        }
      </div>
      <ul class="todo-list">
        {
          for props.tasks.iter().map(|task| {
            render_task(task, &props.id, &props.on_action)
          })
        }
      </ul>
      <div class="todo-stats">
        <span class="todo-count">{ props.stats.label.clone() }</span>
        {
          if props.stats.show_clear_completed {
            html! {
              <button class="clear-completed" onclick={on_clear}>
                { "Clear completed" }
              </button>
            }
          } else {
            html! {}
          }
        }
      </div>
    </div>
  }
}

fn priority_label(
  priority: Priority
) -> &'static str {
  match priority {
    | Priority::High => "High",
    | Priority::Medium => "Medium",
    | Priority::Low => "Low"
  }
}

fn render_task(
  task: &TodoTask,
  widget: &WidgetId,
  on_action: &Callback<DashboardAction>
) -> Html {
  let task_id = task.id;

  let on_toggle = {
    let widget = widget.clone();
    let on_action = on_action.clone();
    Callback::from(
      move |_: web_sys::Event| {
        on_action.emit(
          DashboardAction::TodoToggle(
            widget.clone(),
            task_id
          )
        );
      }
    )
  };

  let on_remove = {
    let widget = widget.clone();
    let on_action = on_action.clone();
    Callback::from(
      move |_: MouseEvent| {
        on_action.emit(
          DashboardAction::TodoRemove(
            widget.clone(),
            task_id
          )
        );
      }
    )
  };

  html! {
    <li
      key={task_id.to_string()}
      class={classes!(
        "todo-item",
        task.completed.then_some("completed"),
        format!("priority-{}", task.priority.as_str())
      )}
    >
      <div class="todo-main">
        <input
          type="checkbox"
          class="todo-checkbox"
          checked={task.completed}
          onchange={on_toggle}
        />
        <span class="todo-text">{ task.text.clone() }</span>
        <div class="todo-badges">
          <span class={classes!(
            "priority-badge",
            task.priority.as_str()
          )}>
            { task.priority.badge() }
          </span>
        </div>
      </div>
      <button class="todo-remove" onclick={on_remove}>{ "×" }</button>
    </li>
  }
}
