// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Static knowledge about Python's builtins and a slice of its standard library.
//!
//! Kinds use the engine's raw type tags (`function`, `class`, `instance`,
//! `keyword`, `module`, `property`) so they flow through the same
//! allow-list mapping as anything else an engine reports.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// A named member with its raw type tag and (possibly empty) documentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Member {
    pub name: &'static str,
    pub kind: &'static str,
    pub doc: &'static str,
}

impl Member {
    pub const fn function(name: &'static str, doc: &'static str) -> Self {
        Self { name, kind: "function", doc }
    }

    pub const fn class(name: &'static str, doc: &'static str) -> Self {
        Self { name, kind: "class", doc }
    }

    pub const fn instance(name: &'static str, doc: &'static str) -> Self {
        Self { name, kind: "instance", doc }
    }

    pub const fn property(name: &'static str, doc: &'static str) -> Self {
        Self { name, kind: "property", doc }
    }

    pub const fn module(name: &'static str, doc: &'static str) -> Self {
        Self { name, kind: "module", doc }
    }

    pub const fn keyword(name: &'static str) -> Self {
        Self { name, kind: "keyword", doc: "" }
    }

    /// Docstring as an option, treating empty as absent.
    pub fn docstring(&self) -> Option<&'static str> {
        (!self.doc.is_empty()).then_some(self.doc)
    }
}

use Member as M;

/// Builtin functions, types, exceptions and constants.
pub static BUILTINS: &[Member] = &[
    M::function("abs", "Return the absolute value of the argument."),
    M::function("all", "Return True if bool(x) is True for all values x in the iterable.\n\nIf the iterable is empty, return True."),
    M::function("any", "Return True if bool(x) is True for any x in the iterable.\n\nIf the iterable is empty, return False."),
    M::function("ascii", "Return an ASCII-only representation of an object."),
    M::function("bin", "Return the binary representation of an integer."),
    M::function("breakpoint", "Call sys.breakpointhook(*args, **kws)."),
    M::function("callable", "Return whether the object is callable (i.e., some kind of function)."),
    M::function("chr", "Return a Unicode string of one character with ordinal i; 0 <= i <= 0x10ffff."),
    M::function("compile", "Compile source into a code object that can be executed by exec() or eval()."),
    M::function("delattr", "Deletes the named attribute from the given object."),
    M::function("dir", "Show attributes of an object.\n\nIf called without an argument, return the names in the current scope."),
    M::function("divmod", "Return the tuple (x//y, x%y).  Invariant: div*y + mod == x."),
    M::function("eval", "Evaluate the given source in the context of globals and locals."),
    M::function("exec", "Execute the given source in the context of globals and locals."),
    M::function("format", "Return type(value).__format__(value, format_spec)"),
    M::function("getattr", "Get a named attribute from an object.\n\ngetattr(x, 'y') is equivalent to x.y. When a default argument is given, it is returned when the attribute doesn't exist."),
    M::function("globals", "Return the dictionary containing the current scope's global variables."),
    M::function("hasattr", "Return whether the object has an attribute with the given name."),
    M::function("hash", "Return the hash value for the given object."),
    M::function("help", "Define the builtin 'help'."),
    M::function("hex", "Return the hexadecimal representation of an integer."),
    M::function("id", "Return the identity of an object."),
    M::function("input", "Read a string from standard input.  The trailing newline is stripped.\n\nThe prompt string, if given, is printed to standard output without a trailing newline before reading input."),
    M::function("isinstance", "Return whether an object is an instance of a class or of a subclass thereof."),
    M::function("issubclass", "Return whether 'cls' is derived from another class or is the same class."),
    M::function("iter", "Get an iterator from an object.\n\nIn the first form, the argument must supply its own iterator, or be a sequence. In the second form, the callable is called until it returns the sentinel."),
    M::function("len", "Return the number of items in a container."),
    M::function("locals", "Return a dictionary containing the current scope's local variables."),
    M::function("max", "With a single iterable argument, return its biggest item.\n\nWith two or more positional arguments, return the largest argument."),
    M::function("min", "With a single iterable argument, return its smallest item.\n\nWith two or more positional arguments, return the smallest argument."),
    M::function("next", "Return the next item from the iterator.\n\nIf default is given and the iterator is exhausted, it is returned instead of raising StopIteration."),
    M::function("oct", "Return the octal representation of an integer."),
    M::function("open", "Open file and return a stream.  Raise OSError upon failure."),
    M::function("ord", "Return the Unicode code point for a one-character string."),
    M::function("pow", "Equivalent to base**exp with 2 arguments or base**exp % mod with 3 arguments"),
    M::function("print", "Prints the values to a stream, or to sys.stdout by default.\n\nsep\n  string inserted between values, default a space.\nend\n  string appended after the last value, default a newline.\nfile\n  a file-like object (stream); defaults to the current sys.stdout.\nflush\n  whether to forcibly flush the stream."),
    M::function("repr", "Return the canonical string representation of the object."),
    M::function("round", "Round a number to a given precision in decimal digits.\n\nThe return value is an integer if ndigits is omitted or None."),
    M::function("setattr", "Sets the named attribute on the given object to the specified value."),
    M::function("sorted", "Return a new list containing all items from the iterable in ascending order.\n\nA custom key function can be supplied to customize the sort order, and the reverse flag can be set to request the result in descending order."),
    M::function("sum", "Return the sum of a 'start' value (default: 0) plus an iterable of numbers"),
    M::function("vars", "Show vars.\n\nWithout arguments, equivalent to locals(). With an argument, equivalent to object.__dict__."),
    M::function("__import__", "Import a module."),
    M::class("bool", "Returns True when the argument is true, False otherwise."),
    M::class("bytearray", "A mutable sequence of integers in the range 0 <= x < 256."),
    M::class("bytes", "Construct an immutable array of bytes."),
    M::class("classmethod", "Convert a function to be a class method."),
    M::class("complex", "Create a complex number from a real part and an optional imaginary part."),
    M::class("dict", "dict() -> new empty dictionary\ndict(mapping) -> new dictionary initialized from a mapping object's (key, value) pairs"),
    M::class("enumerate", "Return an enumerate object.\n\nThe enumerate object yields pairs containing a count (from start, which defaults to zero) and a value yielded by the iterable argument."),
    M::class("filter", "Return an iterator yielding those items of iterable for which function(item) is true."),
    M::class("float", "Convert a string or number to a floating-point number, if possible."),
    M::class("frozenset", "Build an immutable unordered collection of unique elements."),
    M::class("int", "Convert a number or string to an integer, or return 0 if no arguments are given."),
    M::class("list", "Built-in mutable sequence.\n\nIf no argument is given, the constructor creates a new empty list."),
    M::class("map", "Make an iterator that computes the function using arguments from each of the iterables."),
    M::class("memoryview", "Create a new memoryview object which references the given object."),
    M::class("object", "The base class of the class hierarchy."),
    M::class("property", "Property attribute."),
    M::class("range", "Return an object that produces a sequence of integers from start (inclusive) to stop (exclusive) by step."),
    M::class("reversed", "Return a reverse iterator over the values of the given sequence."),
    M::class("set", "Build an unordered collection of unique elements."),
    M::class("slice", "Create a slice object."),
    M::class("staticmethod", "Convert a function to be a static method."),
    M::class("str", "Create a new string object from the given object."),
    M::class("super", "super() -> same as super(__class__, <first argument>)"),
    M::class("tuple", "Built-in immutable sequence.\n\nIf no argument is given, the constructor returns an empty tuple."),
    M::class("type", "type(object) -> the object's type\ntype(name, bases, dict, **kwds) -> a new type"),
    M::class("zip", "The zip object yields n-length tuples, where n is the number of iterables passed as positional arguments to zip()."),
    M::class("BaseException", "Common base class for all exceptions"),
    M::class("Exception", "Common base class for all non-exit exceptions."),
    M::class("ArithmeticError", "Base class for arithmetic errors."),
    M::class("AssertionError", "Assertion failed."),
    M::class("AttributeError", "Attribute not found."),
    M::class("BufferError", "Buffer error."),
    M::class("EOFError", "Read beyond end of file."),
    M::class("FileExistsError", "File already exists."),
    M::class("FileNotFoundError", "File not found."),
    M::class("FloatingPointError", "Floating-point operation failed."),
    M::class("GeneratorExit", "Request that a generator exit."),
    M::class("ImportError", "Import can't find module, or can't find name in module."),
    M::class("IndentationError", "Improper indentation."),
    M::class("IndexError", "Sequence index out of range."),
    M::class("KeyError", "Mapping key not found."),
    M::class("KeyboardInterrupt", "Program interrupted by user."),
    M::class("LookupError", "Base class for lookup errors."),
    M::class("MemoryError", "Out of memory."),
    M::class("ModuleNotFoundError", "Module not found."),
    M::class("NameError", "Name not found globally."),
    M::class("NotImplementedError", "Method or function hasn't been implemented yet."),
    M::class("OSError", "Base class for I/O related errors."),
    M::class("OverflowError", "Result too large to be represented."),
    M::class("PermissionError", "Not enough permissions."),
    M::class("RecursionError", "Recursion limit exceeded."),
    M::class("RuntimeError", "Unspecified run-time error."),
    M::class("StopIteration", "Signal the end from iterator.__next__()."),
    M::class("StopAsyncIteration", "Signal the end from iterator.__anext__()."),
    M::class("SyntaxError", "Invalid syntax."),
    M::class("SystemExit", "Request to exit from the interpreter."),
    M::class("TimeoutError", "Timeout expired."),
    M::class("TypeError", "Inappropriate argument type."),
    M::class("UnboundLocalError", "Local name referenced but not bound to a value."),
    M::class("UnicodeDecodeError", "Unicode decoding error."),
    M::class("UnicodeEncodeError", "Unicode encoding error."),
    M::class("UnicodeError", "Unicode related error."),
    M::class("ValueError", "Inappropriate argument value (of correct type)."),
    M::class("ZeroDivisionError", "Second argument to a division or modulo operation was zero."),
    M::class("Warning", "Base class for warning categories."),
    M::class("UserWarning", "Base class for warnings generated by user code."),
    M::class("DeprecationWarning", "Base class for warnings about deprecated features."),
    M::class("RuntimeWarning", "Base class for warnings about dubious runtime behavior."),
    M::instance("Ellipsis", ""),
    M::instance("NotImplemented", ""),
    M::instance("__name__", ""),
    M::instance("__doc__", ""),
    M::instance("__file__", ""),
];

/// Reserved words, offered in name position only.
pub static KEYWORDS: &[Member] = &[
    M::keyword("False"),
    M::keyword("None"),
    M::keyword("True"),
    M::keyword("and"),
    M::keyword("as"),
    M::keyword("assert"),
    M::keyword("async"),
    M::keyword("await"),
    M::keyword("break"),
    M::keyword("class"),
    M::keyword("continue"),
    M::keyword("def"),
    M::keyword("del"),
    M::keyword("elif"),
    M::keyword("else"),
    M::keyword("except"),
    M::keyword("finally"),
    M::keyword("for"),
    M::keyword("from"),
    M::keyword("global"),
    M::keyword("if"),
    M::keyword("import"),
    M::keyword("in"),
    M::keyword("is"),
    M::keyword("lambda"),
    M::keyword("nonlocal"),
    M::keyword("not"),
    M::keyword("or"),
    M::keyword("pass"),
    M::keyword("raise"),
    M::keyword("return"),
    M::keyword("try"),
    M::keyword("while"),
    M::keyword("with"),
    M::keyword("yield"),
];

/// Members every class inherits from `object`.
pub static OBJECT_MEMBERS: &[Member] = &[
    M::instance("__class__", ""),
    M::instance("__dict__", ""),
    M::instance("__doc__", ""),
    M::instance("__module__", ""),
    M::function("__init__", "Initialize self.  See help(type(self)) for accurate signature."),
    M::function("__repr__", "Return repr(self)."),
    M::function("__str__", "Return str(self)."),
    M::function("__eq__", "Return self==value."),
    M::function("__ne__", "Return self!=value."),
    M::function("__hash__", "Return hash(self)."),
    M::function("__getattribute__", "Return getattr(self, name)."),
    M::function("__setattr__", "Implement setattr(self, name, value)."),
    M::function("__dir__", "Default dir() implementation."),
];

static STR_MEMBERS: &[Member] = &[
    M::function("capitalize", "Return a capitalized version of the string."),
    M::function("casefold", "Return a version of the string suitable for caseless comparisons."),
    M::function("center", "Return a centered string of length width."),
    M::function("count", "Return the number of non-overlapping occurrences of substring sub in string S[start:end]."),
    M::function("encode", "Encode the string using the codec registered for encoding."),
    M::function("endswith", "Return True if the string ends with the specified suffix, False otherwise."),
    M::function("expandtabs", "Return a copy where all tab characters are expanded using spaces."),
    M::function("find", "Return the lowest index in S where substring sub is found.\n\nReturn -1 on failure."),
    M::function("format", "Return a formatted version of the string, using substitutions from args and kwargs."),
    M::function("format_map", "Return a formatted version of the string, using substitutions from mapping."),
    M::function("index", "Return the lowest index in S where substring sub is found.\n\nRaises ValueError when the substring is not found."),
    M::function("isalnum", "Return True if the string is an alpha-numeric string, False otherwise."),
    M::function("isalpha", "Return True if the string is an alphabetic string, False otherwise."),
    M::function("isascii", "Return True if all characters in the string are ASCII, False otherwise."),
    M::function("isdecimal", "Return True if the string is a decimal string, False otherwise."),
    M::function("isdigit", "Return True if the string is a digit string, False otherwise."),
    M::function("isidentifier", "Return True if the string is a valid Python identifier, False otherwise."),
    M::function("islower", "Return True if the string is a lowercase string, False otherwise."),
    M::function("isnumeric", "Return True if the string is a numeric string, False otherwise."),
    M::function("isprintable", "Return True if the string is printable, False otherwise."),
    M::function("isspace", "Return True if the string is a whitespace string, False otherwise."),
    M::function("istitle", "Return True if the string is a title-cased string, False otherwise."),
    M::function("isupper", "Return True if the string is an uppercase string, False otherwise."),
    M::function("join", "Concatenate any number of strings.\n\nThe string whose method is called is inserted in between each given string."),
    M::function("ljust", "Return a left-justified string of length width."),
    M::function("lower", "Return a copy of the string converted to lowercase."),
    M::function("lstrip", "Return a copy of the string with leading whitespace removed."),
    M::function("maketrans", "Return a translation table usable for str.translate()."),
    M::function("partition", "Partition the string into three parts using the given separator."),
    M::function("removeprefix", "Return a str with the given prefix string removed if present."),
    M::function("removesuffix", "Return a str with the given suffix string removed if present."),
    M::function("replace", "Return a copy with all occurrences of substring old replaced by new."),
    M::function("rfind", "Return the highest index in S where substring sub is found.\n\nReturn -1 on failure."),
    M::function("rindex", "Return the highest index in S where substring sub is found."),
    M::function("rjust", "Return a right-justified string of length width."),
    M::function("rpartition", "Partition the string into three parts using the given separator, searching from the end."),
    M::function("rsplit", "Return a list of the substrings in the string, using sep as the separator string, splitting from the right."),
    M::function("rstrip", "Return a copy of the string with trailing whitespace removed."),
    M::function("split", "Return a list of the substrings in the string, using sep as the separator string.\n\nsep\n  The separator used to split the string.\nmaxsplit\n  Maximum number of splits. -1 (the default value) means no limit."),
    M::function("splitlines", "Return a list of the lines in the string, breaking at line boundaries."),
    M::function("startswith", "Return True if the string starts with the specified prefix, False otherwise."),
    M::function("strip", "Return a copy of the string with leading and trailing whitespace removed."),
    M::function("swapcase", "Convert uppercase characters to lowercase and lowercase characters to uppercase."),
    M::function("title", "Return a version of the string where each word is titlecased."),
    M::function("translate", "Replace each character in the string using the given translation table."),
    M::function("upper", "Return a copy of the string converted to uppercase."),
    M::function("zfill", "Pad a numeric string with zeros on the left, to fill a field of the given width."),
];

static LIST_MEMBERS: &[Member] = &[
    M::function("append", "Append object to the end of the list."),
    M::function("clear", "Remove all items from list."),
    M::function("copy", "Return a shallow copy of the list."),
    M::function("count", "Return number of occurrences of value."),
    M::function("extend", "Extend list by appending elements from the iterable."),
    M::function("index", "Return first index of value.\n\nRaises ValueError if the value is not present."),
    M::function("insert", "Insert object before index."),
    M::function("pop", "Remove and return item at index (default last).\n\nRaises IndexError if list is empty or index is out of range."),
    M::function("remove", "Remove first occurrence of value.\n\nRaises ValueError if the value is not present."),
    M::function("reverse", "Reverse *IN PLACE*."),
    M::function("sort", "Sort the list in ascending order and return None."),
];

static DICT_MEMBERS: &[Member] = &[
    M::function("clear", "Remove all items from the dict."),
    M::function("copy", "Return a shallow copy of the dict."),
    M::function("fromkeys", "Create a new dictionary with keys from iterable and values set to value."),
    M::function("get", "Return the value for key if key is in the dictionary, else default."),
    M::function("items", "Return a set-like object providing a view on the dict's items."),
    M::function("keys", "Return a set-like object providing a view on the dict's keys."),
    M::function("pop", "D.pop(k[,d]) -> v, remove specified key and return the corresponding value."),
    M::function("popitem", "Remove and return a (key, value) pair as a 2-tuple."),
    M::function("setdefault", "Insert key with a value of default if key is not in the dictionary."),
    M::function("update", "Update the dict from a mapping or an iterable of key/value pairs."),
    M::function("values", "Return an object providing a view on the dict's values."),
];

static SET_MEMBERS: &[Member] = &[
    M::function("add", "Add an element to a set."),
    M::function("clear", "Remove all elements from this set."),
    M::function("copy", "Return a shallow copy of a set."),
    M::function("difference", "Return a new set with elements in the set that are not in the others."),
    M::function("difference_update", "Update the set, removing elements found in others."),
    M::function("discard", "Remove an element from a set if it is a member."),
    M::function("intersection", "Return a new set with elements common to the set and all others."),
    M::function("intersection_update", "Update the set, keeping only elements found in it and all others."),
    M::function("isdisjoint", "Return True if two sets have a null intersection."),
    M::function("issubset", "Report whether another set contains this set."),
    M::function("issuperset", "Report whether this set contains another set."),
    M::function("pop", "Remove and return an arbitrary set element."),
    M::function("remove", "Remove an element from a set; it must be a member."),
    M::function("symmetric_difference", "Return a new set with elements in either the set or other but not both."),
    M::function("symmetric_difference_update", "Update the set, keeping only elements found in either set, but not in both."),
    M::function("union", "Return a new set with elements from the set and all others."),
    M::function("update", "Update the set, adding elements from all others."),
];

static TUPLE_MEMBERS: &[Member] = &[
    M::function("count", "Return number of occurrences of value."),
    M::function("index", "Return first index of value."),
];

static INT_MEMBERS: &[Member] = &[
    M::function("as_integer_ratio", "Return a pair of integers, whose ratio is equal to the original int."),
    M::function("bit_count", "Number of ones in the binary representation of the absolute value of self."),
    M::function("bit_length", "Number of bits necessary to represent self in binary."),
    M::function("conjugate", "Returns self, the complex conjugate of any int."),
    M::property("denominator", "the denominator of a rational number in lowest terms"),
    M::function("from_bytes", "Return the integer represented by the given array of bytes."),
    M::property("imag", "the imaginary part of a complex number"),
    M::function("is_integer", "Returns True. Exists for duck type compatibility with float.is_integer."),
    M::property("numerator", "the numerator of a rational number in lowest terms"),
    M::property("real", "the real part of a complex number"),
    M::function("to_bytes", "Return an array of bytes representing an integer."),
];

static FLOAT_MEMBERS: &[Member] = &[
    M::function("as_integer_ratio", "Return a pair of integers, whose ratio is exactly equal to the original float."),
    M::function("conjugate", "Return self, the complex conjugate of any float."),
    M::function("fromhex", "Create a floating-point number from a hexadecimal string."),
    M::function("hex", "Return a hexadecimal representation of a floating-point number."),
    M::property("imag", "the imaginary part of a complex number"),
    M::function("is_integer", "Return True if the float is an integer."),
    M::property("real", "the real part of a complex number"),
];

static BYTES_MEMBERS: &[Member] = &[
    M::function("capitalize", "B.capitalize() -> copy of B"),
    M::function("count", "Return the number of non-overlapping occurrences of subsection 'sub' in bytes B[start:end]."),
    M::function("decode", "Decode the bytes using the codec registered for encoding."),
    M::function("endswith", "Return True if the bytes ends with the specified suffix, False otherwise."),
    M::function("find", "Return the lowest index in B where subsection 'sub' is found."),
    M::function("fromhex", "Create a bytes object from a string of hexadecimal numbers."),
    M::function("hex", "Create a string of hexadecimal numbers from a bytes object."),
    M::function("index", "Return the lowest index in B where subsection 'sub' is found."),
    M::function("join", "Concatenate any number of bytes objects."),
    M::function("lower", "B.lower() -> copy of B"),
    M::function("lstrip", "Strip leading bytes contained in the argument."),
    M::function("replace", "Return a copy with all occurrences of substring old replaced by new."),
    M::function("rstrip", "Strip trailing bytes contained in the argument."),
    M::function("split", "Return a list of the sections in the bytes, using sep as the delimiter."),
    M::function("startswith", "Return True if the bytes starts with the specified prefix, False otherwise."),
    M::function("strip", "Strip leading and trailing bytes contained in the argument."),
    M::function("upper", "B.upper() -> copy of B"),
];

/// Names of builtin types whose members are known.
pub const KNOWN_TYPES: &[&str] = &["str", "list", "dict", "set", "tuple", "int", "float", "bytes", "bool"];

/// Members of a builtin type, if it is one we know.
pub fn type_members(type_name: &str) -> Option<&'static [Member]> {
    match type_name {
        "str" => Some(STR_MEMBERS),
        "list" => Some(LIST_MEMBERS),
        "dict" => Some(DICT_MEMBERS),
        "set" | "frozenset" => Some(SET_MEMBERS),
        "tuple" => Some(TUPLE_MEMBERS),
        "int" | "bool" => Some(INT_MEMBERS),
        "float" => Some(FLOAT_MEMBERS),
        "bytes" => Some(BYTES_MEMBERS),
        _ => None,
    }
}

static MATH_MEMBERS: &[Member] = &[
    M::function("acos", "Return the arc cosine (measured in radians) of x."),
    M::function("asin", "Return the arc sine (measured in radians) of x."),
    M::function("atan", "Return the arc tangent (measured in radians) of x."),
    M::function("atan2", "Return the arc tangent (measured in radians) of y/x."),
    M::function("ceil", "Return the ceiling of x as an Integral.\n\nThis is the smallest integer >= x."),
    M::function("comb", "Number of ways to choose k items from n items without repetition and without order."),
    M::function("copysign", "Return a float with the magnitude (absolute value) of x but the sign of y."),
    M::function("cos", "Return the cosine of x (measured in radians)."),
    M::function("degrees", "Convert angle x from radians to degrees."),
    M::function("dist", "Return the Euclidean distance between two points p and q."),
    M::instance("e", ""),
    M::function("exp", "Return e raised to the power of x."),
    M::function("fabs", "Return the absolute value of the float x."),
    M::function("factorial", "Find n!.\n\nRaise a ValueError if x is negative or non-integral."),
    M::function("floor", "Return the floor of x as an Integral.\n\nThis is the largest integer <= x."),
    M::function("fsum", "Return an accurate floating-point sum of values in the iterable seq."),
    M::function("gcd", "Greatest Common Divisor."),
    M::function("hypot", "Multidimensional Euclidean distance from the origin to a point."),
    M::instance("inf", ""),
    M::function("isclose", "Determine whether two floating-point numbers are close in value."),
    M::function("isfinite", "Return True if x is neither an infinity nor a NaN, and False otherwise."),
    M::function("isinf", "Return True if x is a positive or negative infinity, and False otherwise."),
    M::function("isnan", "Return True if x is a NaN (not a number), and False otherwise."),
    M::function("isqrt", "Return the integer part of the square root of the input."),
    M::function("lcm", "Least Common Multiple."),
    M::function("log", "log(x, [base=math.e])\nReturn the logarithm of x to the given base."),
    M::function("log10", "Return the base 10 logarithm of x."),
    M::function("log2", "Return the base 2 logarithm of x."),
    M::function("modf", "Return the fractional and integer parts of x."),
    M::instance("nan", ""),
    M::function("perm", "Number of ways to choose k items from n items without repetition and with order."),
    M::instance("pi", ""),
    M::function("pow", "Return x**y (x to the power of y)."),
    M::function("prod", "Calculate the product of all the elements in the input iterable."),
    M::function("radians", "Convert angle x from degrees to radians."),
    M::function("remainder", "Difference between x and the closest integer multiple of y."),
    M::function("sin", "Return the sine of x (measured in radians)."),
    M::function("sqrt", "Return the square root of x."),
    M::function("tan", "Return the tangent of x (measured in radians)."),
    M::instance("tau", ""),
    M::function("trunc", "Truncates the Real x to the nearest Integral toward 0."),
];

static OS_MEMBERS: &[Member] = &[
    M::function("chdir", "Change the current working directory to the specified path."),
    M::function("cpu_count", "Return the number of logical CPUs in the system."),
    M::instance("environ", ""),
    M::function("getcwd", "Return a unicode string representing the current working directory."),
    M::function("getenv", "Get an environment variable, return None if it doesn't exist."),
    M::function("getpid", "Return the current process id."),
    M::instance("linesep", ""),
    M::function("listdir", "Return a list containing the names of the files in the directory."),
    M::function("makedirs", "makedirs(name [, mode=0o777][, exist_ok=False])\n\nSuper-mkdir; create a leaf directory and all intermediate ones."),
    M::function("mkdir", "Create a directory."),
    M::instance("name", ""),
    M::module("path", "Common operations on Posix pathnames."),
    M::function("remove", "Remove a file (same as unlink())."),
    M::function("rename", "Rename a file or directory."),
    M::function("rmdir", "Remove a directory."),
    M::function("scandir", "Return an iterator of DirEntry objects for given path."),
    M::instance("sep", ""),
    M::function("stat", "Perform a stat system call on the given path."),
    M::function("system", "Execute the command in a subshell."),
    M::function("urandom", "Return a bytes object containing random bytes suitable for cryptographic use."),
    M::function("walk", "Directory tree generator."),
];

static OS_PATH_MEMBERS: &[Member] = &[
    M::function("abspath", "Return an absolute path."),
    M::function("basename", "Returns the final component of a pathname"),
    M::function("dirname", "Returns the directory component of a pathname"),
    M::function("exists", "Test whether a path exists.  Returns False for broken symbolic links"),
    M::function("expanduser", "Expand ~ and ~user constructions.  If user or $HOME is unknown, do nothing."),
    M::function("getsize", "Return the size of a file, reported by os.stat()."),
    M::function("isabs", "Test whether a path is absolute"),
    M::function("isdir", "Return true if the pathname refers to an existing directory."),
    M::function("isfile", "Test whether a path is a regular file"),
    M::function("join", "Join two or more pathname components, inserting '/' as needed."),
    M::function("normpath", "Normalize path, eliminating double slashes, etc."),
    M::function("relpath", "Return a relative version of a path"),
    M::instance("sep", ""),
    M::function("split", "Split a pathname.  Returns tuple \"(head, tail)\" where \"tail\" is everything after the final slash."),
    M::function("splitext", "Split the extension from a pathname."),
];

static SYS_MEMBERS: &[Member] = &[
    M::instance("argv", ""),
    M::instance("executable", ""),
    M::function("exit", "Exit the interpreter by raising SystemExit(status)."),
    M::function("getrecursionlimit", "Return the current value of the recursion limit."),
    M::function("getsizeof", "getsizeof(object [, default]) -> int\n\nReturn the size of object in bytes."),
    M::instance("maxsize", ""),
    M::instance("modules", ""),
    M::instance("path", ""),
    M::instance("platform", ""),
    M::function("setrecursionlimit", "Set the maximum depth of the Python interpreter stack to n."),
    M::instance("stderr", ""),
    M::instance("stdin", ""),
    M::instance("stdout", ""),
    M::instance("version", ""),
    M::instance("version_info", ""),
];

static JSON_MEMBERS: &[Member] = &[
    M::class("JSONDecodeError", "Subclass of ValueError with the following additional properties."),
    M::class("JSONDecoder", "Simple JSON decoder"),
    M::class("JSONEncoder", "Extensible JSON encoder for Python data structures."),
    M::function("dump", "Serialize ``obj`` as a JSON formatted stream to ``fp`` (a ``.write()``-supporting file-like object)."),
    M::function("dumps", "Serialize ``obj`` to a JSON formatted ``str``."),
    M::function("load", "Deserialize ``fp`` (a ``.read()``-supporting file-like object containing a JSON document) to a Python object."),
    M::function("loads", "Deserialize ``s`` (a ``str``, ``bytes`` or ``bytearray`` instance containing a JSON document) to a Python object."),
];

static RANDOM_MEMBERS: &[Member] = &[
    M::class("Random", "Random number generator base class used by bound module functions."),
    M::function("choice", "Choose a random element from a non-empty sequence."),
    M::function("choices", "Return a k sized list of population elements chosen with replacement."),
    M::function("gauss", "Gaussian distribution."),
    M::function("randint", "Return random integer in range [a, b], including both end points."),
    M::function("random", "random() -> x in the interval [0, 1)."),
    M::function("randrange", "Choose a random item from range(stop) or range(start, stop[, step])."),
    M::function("sample", "Chooses k unique random elements from a population sequence."),
    M::function("seed", "Initialize internal state from a seed."),
    M::function("shuffle", "Shuffle list x in place, and return None."),
    M::function("uniform", "Get a random number in the range [a, b) or [a, b] depending on rounding."),
];

static RE_MEMBERS: &[Member] = &[
    M::instance("DOTALL", ""),
    M::instance("IGNORECASE", ""),
    M::class("Match", "The result of re.match() and re.search()."),
    M::instance("MULTILINE", ""),
    M::class("Pattern", "Compiled regular expression object."),
    M::instance("VERBOSE", ""),
    M::function("compile", "Compile a regular expression pattern, returning a Pattern object."),
    M::class("error", "Exception raised for invalid regular expressions."),
    M::function("escape", "Escape special characters in a string."),
    M::function("findall", "Return a list of all non-overlapping matches in the string."),
    M::function("finditer", "Return an iterator over all non-overlapping matches in the string."),
    M::function("fullmatch", "Try to apply the pattern to all of the string, returning a Match object, or None if no match was found."),
    M::function("match", "Try to apply the pattern at the start of the string, returning a Match object, or None if no match was found."),
    M::function("search", "Scan through string looking for a match to the pattern, returning a Match object, or None if no match was found."),
    M::function("split", "Split the source string by the occurrences of the pattern, returning a list containing the resulting substrings."),
    M::function("sub", "Return the string obtained by replacing the leftmost non-overlapping occurrences of the pattern in string by the replacement repl."),
    M::function("subn", "Return a 2-tuple containing (new_string, number)."),
];

static TIME_MEMBERS: &[Member] = &[
    M::function("ctime", "Convert a time in seconds since the Epoch to a string in local time."),
    M::function("gmtime", "Convert seconds since the Epoch to a time tuple expressing UTC."),
    M::function("localtime", "Convert seconds since the Epoch to a time tuple expressing local time."),
    M::function("monotonic", "Monotonic clock, cannot go backward."),
    M::function("perf_counter", "Performance counter for benchmarking."),
    M::function("process_time", "Process time for profiling: sum of the kernel and user-space CPU time."),
    M::function("sleep", "Delay execution for a given number of seconds.\n\nThe argument may be a floating-point number for subsecond precision."),
    M::function("strftime", "Convert a time tuple to a string according to a format specification."),
    M::function("strptime", "Parse a string to a time tuple according to a format specification."),
    M::function("time", "Return the current time in seconds since the Epoch."),
    M::function("time_ns", "Return the current time in nanoseconds since the Epoch."),
];

static STRING_MEMBERS: &[Member] = &[
    M::class("Formatter", ""),
    M::class("Template", "A string class for supporting $-substitutions."),
    M::instance("ascii_letters", ""),
    M::instance("ascii_lowercase", ""),
    M::instance("ascii_uppercase", ""),
    M::function("capwords", "capwords(s [,sep]) -> string\n\nSplit the argument into words using split, capitalize each word using capitalize, and join the capitalized words using join."),
    M::instance("digits", ""),
    M::instance("hexdigits", ""),
    M::instance("octdigits", ""),
    M::instance("printable", ""),
    M::instance("punctuation", ""),
    M::instance("whitespace", ""),
];

static ITERTOOLS_MEMBERS: &[Member] = &[
    M::class("accumulate", "Return series of accumulated sums (or other binary function results)."),
    M::class("batched", "Batch data into tuples of length n. The last batch may be shorter than n."),
    M::class("chain", "Return a chain object whose .__next__() method returns elements from the first iterable until it is exhausted, then elements from the next iterable."),
    M::class("combinations", "Return successive r-length combinations of elements in the iterable."),
    M::class("combinations_with_replacement", "Return successive r-length combinations of elements in the iterable allowing individual elements to have successive repeats."),
    M::class("compress", "Return data elements corresponding to true selector elements."),
    M::class("count", "Return a count object whose .__next__() method returns consecutive values."),
    M::class("cycle", "Return elements from the iterable until it is exhausted. Then repeat the sequence indefinitely."),
    M::class("dropwhile", "Drop items from the iterable while predicate(item) is true."),
    M::class("filterfalse", "Return those items of iterable for which function(item) is false."),
    M::class("groupby", "make an iterator that returns consecutive keys and groups from the iterable"),
    M::class("islice", "islice(iterable, stop) --> islice object"),
    M::class("pairwise", "Return an iterator of overlapping pairs taken from the input iterator."),
    M::class("permutations", "Return successive r-length permutations of elements in the iterable."),
    M::class("product", "Cartesian product of input iterables.  Equivalent to nested for-loops."),
    M::class("repeat", "repeat(object [,times]) -> create an iterator which returns the object for the specified number of times."),
    M::class("starmap", "Return an iterator whose values are returned from the function evaluated with an argument tuple taken from the given sequence."),
    M::class("takewhile", "Return successive entries from an iterable as long as the predicate evaluates to true for each entry."),
    M::class("tee", "Returns a tuple of n independent iterators."),
    M::class("zip_longest", "Return a zip_longest object whose .__next__() method returns a tuple."),
];

static COLLECTIONS_MEMBERS: &[Member] = &[
    M::class("ChainMap", "A ChainMap groups multiple dicts (or other mappings) together to create a single, updateable view."),
    M::class("Counter", "Dict subclass for counting hashable items.  Sometimes called a bag or multiset."),
    M::class("OrderedDict", "Dictionary that remembers insertion order"),
    M::class("UserDict", ""),
    M::class("UserList", "A more or less complete user-defined wrapper around list objects."),
    M::class("UserString", ""),
    M::class("defaultdict", "defaultdict(default_factory=None, /, [...]) --> dict with default factory"),
    M::class("deque", "A list-like sequence optimized for data accesses near its endpoints."),
    M::function("namedtuple", "Returns a new subclass of tuple with named fields."),
];

static FUNCTOOLS_MEMBERS: &[Member] = &[
    M::function("cache", "Simple lightweight unbounded cache.  Sometimes called \"memoize\"."),
    M::class("cached_property", ""),
    M::function("cmp_to_key", "Convert a cmp= function into a key= function."),
    M::function("lru_cache", "Least-recently-used cache decorator."),
    M::class("partial", "Create a new function with partial application of the given arguments and keywords."),
    M::function("reduce", "Apply a function of two arguments cumulatively to the items of an iterable, from left to right."),
    M::function("singledispatch", "Single-dispatch generic function decorator."),
    M::function("total_ordering", "Class decorator that fills in missing ordering methods"),
    M::function("wraps", "Decorator factory to apply update_wrapper() to a wrapper function"),
];

static DATETIME_MEMBERS: &[Member] = &[
    M::instance("MAXYEAR", ""),
    M::instance("MINYEAR", ""),
    M::instance("UTC", ""),
    M::class("date", "date(year, month, day) --> date object"),
    M::class("datetime", "datetime(year, month, day[, hour[, minute[, second[, microsecond[,tzinfo]]]]])\n\nThe year, month and day arguments are required."),
    M::class("time", "time([hour[, minute[, second[, microsecond[, tzinfo]]]]]) --> a time object"),
    M::class("timedelta", "Difference between two datetime values."),
    M::class("timezone", "Fixed offset from UTC implementation of tzinfo."),
    M::class("tzinfo", "Abstract base class for time zone info objects."),
];

/// Standard-library modules with their documentation, in completion order.
pub static MODULES: &[Member] = &[
    M::module("collections", "This module implements specialized container datatypes providing alternatives to Python's general purpose built-in containers, dict, list, set, and tuple."),
    M::module("datetime", "Fast implementation of the datetime type."),
    M::module("functools", "functools.py - Tools for working with functions and callable objects"),
    M::module("itertools", "Functional tools for creating and using iterators."),
    M::module("json", "JSON (JavaScript Object Notation) is a subset of JavaScript syntax (ECMA-262 3rd edition) used as a lightweight data interchange format."),
    M::module("math", "This module provides access to the mathematical functions defined by the C standard."),
    M::module("os", "OS routines for NT or Posix depending on what system we're on."),
    M::module("random", "Random variable generators."),
    M::module("re", "Support for regular expressions (RE)."),
    M::module("string", "A collection of string constants."),
    M::module("sys", "This module provides access to some objects used or maintained by the interpreter and to functions that interact strongly with the interpreter."),
    M::module("time", "This module provides various functions to manipulate time values."),
];

/// Members of a known module, by dotted path.
pub fn module_members(path: &str) -> Option<&'static [Member]> {
    match path {
        "math" => Some(MATH_MEMBERS),
        "os" => Some(OS_MEMBERS),
        "os.path" | "posixpath" => Some(OS_PATH_MEMBERS),
        "sys" => Some(SYS_MEMBERS),
        "json" => Some(JSON_MEMBERS),
        "random" => Some(RANDOM_MEMBERS),
        "re" => Some(RE_MEMBERS),
        "time" => Some(TIME_MEMBERS),
        "string" => Some(STRING_MEMBERS),
        "itertools" => Some(ITERTOOLS_MEMBERS),
        "collections" => Some(COLLECTIONS_MEMBERS),
        "functools" => Some(FUNCTOOLS_MEMBERS),
        "datetime" => Some(DATETIME_MEMBERS),
        _ => None,
    }
}

/// Documentation entry for a known module, by dotted path.
pub fn module_entry(path: &str) -> Option<Member> {
    if path == "os.path" {
        return Some(M::module("os.path", "Common operations on Posix pathnames."));
    }
    MODULES.iter().copied().find(|m| m.name == path)
}

static BUILTIN_INDEX: Lazy<HashMap<&'static str, Member>> =
    Lazy::new(|| BUILTINS.iter().map(|m| (m.name, *m)).collect());

/// Look up a builtin name.
pub fn builtin(name: &str) -> Option<Member> {
    BUILTIN_INDEX.get(name).copied()
}

/// Look up a keyword.
pub fn keyword(name: &str) -> Option<Member> {
    KEYWORDS.iter().copied().find(|k| k.name == name)
}

/// Find a member by name in a table.
pub fn find_member(members: &[Member], name: &str) -> Option<Member> {
    members.iter().copied().find(|m| m.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        let print = builtin("print").unwrap();
        assert_eq!(print.kind, "function");
        assert!(print.docstring().unwrap().starts_with("Prints the values"));

        assert_eq!(builtin("ValueError").unwrap().kind, "class");
        assert!(builtin("not_a_builtin").is_none());
    }

    #[test]
    fn test_builtin_names_are_unique() {
        let mut names: Vec<_> = BUILTINS.iter().map(|m| m.name).collect();
        names.sort_unstable();
        let before = names.len();
        names.dedup();
        assert_eq!(before, names.len());
    }

    #[test]
    fn test_type_members() {
        let members = type_members("str").unwrap();
        assert!(members.iter().any(|m| m.name == "upper"));
        assert!(type_members("bool").unwrap().iter().any(|m| m.name == "bit_length"));
        assert!(type_members("Widget").is_none());
        for name in KNOWN_TYPES {
            assert!(type_members(name).is_some(), "{name} has no members");
        }
    }

    #[test]
    fn test_module_members() {
        let math = module_members("math").unwrap();
        assert_eq!(find_member(math, "sqrt").unwrap().kind, "function");
        assert_eq!(find_member(math, "pi").unwrap().kind, "instance");
        assert!(module_members("os.path").is_some());
        assert!(module_members("numpy").is_none());
    }

    #[test]
    fn test_every_listed_module_has_members() {
        for module in MODULES {
            assert!(module_members(module.name).is_some(), "{}", module.name);
        }
        assert_eq!(module_entry("os.path").unwrap().kind, "module");
    }

    #[test]
    fn test_keywords() {
        assert!(keyword("lambda").is_some());
        assert_eq!(keyword("None").unwrap().kind, "keyword");
        assert!(keyword("print").is_none());
        assert!(KEYWORDS.iter().all(|k| k.docstring().is_none()));
    }
}
